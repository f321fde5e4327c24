//! Registry of models that can be asked to count words.
//!
//! A plain lookup table: each entry names a model id, a display name and
//! the provider whose API serves it.

use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Model providers with a supported completion API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Anthropic, Provider::Google];

    /// Parse a provider tag (`openai`, `anthropic`, `google`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" => Some(Self::Anthropic),
            "google" | "gemini" => Some(Self::Google),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn credential_env(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Google => "GOOGLE_GENERATIVE_AI_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: Provider,
}

const fn model(id: &'static str, name: &'static str, provider: Provider) -> ModelInfo {
    ModelInfo { id, name, provider }
}

static MODELS: [ModelInfo; 8] = [
    model("gpt-3.5-turbo", "GPT 3.5 Turbo", Provider::OpenAi),
    model("gpt-4", "GPT 4", Provider::OpenAi),
    model("gpt-4o", "GPT 4o", Provider::OpenAi),
    model("gpt-4o-mini", "GPT 4o Mini", Provider::OpenAi),
    model("claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet", Provider::Anthropic),
    model("claude-3-haiku-20240307", "Claude 3 Haiku", Provider::Anthropic),
    model("gemini-1.5-pro", "Gemini 1.5 Pro", Provider::Google),
    model("gemini-1.5-flash", "Gemini 1.5 Flash", Provider::Google),
];

/// Model used when none is selected.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

pub fn all_models() -> &'static [ModelInfo] {
    &MODELS
}

/// Look up a model by its exact id.
pub fn find_model(id: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.id == id)
}

pub fn models_by_provider(provider: Provider) -> Vec<&'static ModelInfo> {
    MODELS.iter().filter(|m| m.provider == provider).collect()
}
