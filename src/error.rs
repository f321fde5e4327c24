use std::io;
use thiserror::Error;

use crate::provider::ProviderError;

/// Core error type for llmcount.
#[derive(Error, Debug)]
pub enum LlmCountError {
    #[error("config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("payload too large: {what}{}, limit is {limit}", describe_size(.actual))]
    PayloadTooLarge {
        what: String,
        /// `None` when the size is unknown, e.g. a streamed body cut off at the limit.
        actual: Option<usize>,
        limit: usize,
    },

    #[error("unsupported model '{model}'")]
    UnsupportedModel { model: String },

    #[error("authentication failed: {message}")]
    Auth { message: String },

    #[error("provider rate limit or quota reached, please retry later")]
    RateLimited,

    #[error("request to the model provider timed out")]
    Timeout,

    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("daily usage quota of {limit} requests reached, try again tomorrow")]
    QuotaExceeded { limit: u32 },
}

impl LlmCountError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn too_large(what: impl Into<String>, actual: usize, limit: usize) -> Self {
        Self::PayloadTooLarge {
            what: what.into(),
            actual: Some(actual),
            limit,
        }
    }

    /// Like [`LlmCountError::too_large`] when only the limit is known.
    pub fn over_limit(what: impl Into<String>, limit: usize) -> Self {
        Self::PayloadTooLarge {
            what: what.into(),
            actual: None,
            limit,
        }
    }

    pub fn unsupported_model(model: impl Into<String>) -> Self {
        Self::UnsupportedModel {
            model: model.into(),
        }
    }

    /// Returns true if this error is caused by user input (vs internal/system).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::PayloadTooLarge { .. }
                | Self::UnsupportedModel { .. }
                | Self::QuotaExceeded { .. }
        )
    }

    /// Returns true if retrying the operation might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Timeout | Self::RateLimited)
    }

    /// HTTP status used when this error crosses the server boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } | Self::UnsupportedModel { .. } => 400,
            Self::Auth { .. } => 401,
            Self::Timeout => 408,
            Self::PayloadTooLarge { .. } => 413,
            Self::RateLimited | Self::QuotaExceeded { .. } => 429,
            Self::Config { .. } | Self::Io { .. } | Self::Provider { .. } => 500,
        }
    }
}

fn describe_size(actual: &Option<usize>) -> String {
    match actual {
        Some(n) => format!(" is {n}"),
        None => String::new(),
    }
}

impl From<ProviderError> for LlmCountError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Auth { message } => Self::Auth { message },
            ProviderError::RateLimited => Self::RateLimited,
            ProviderError::Timeout => Self::Timeout,
            other => Self::Provider {
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, LlmCountError>;
