//! Request handling shared by the HTTP server and the CLI.
//!
//! Validates input, builds prompts, calls the completion client and
//! reconciles the reply. Transport concerns (status codes, CORS, body
//! parsing) stay in [`crate::server`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::articles;
use crate::config::{LimitsConfig, ProviderConfig};
use crate::error::{LlmCountError, Result};
use crate::frequency::{self, WordCount};
use crate::models::{self, ModelInfo};
use crate::provider::{CompletionClient, CompletionRequest};
use crate::reconcile::reconcile_counts;

const COUNT_SYSTEM_PROMPT: &str = "You are a helpful assistant that counts word occurrences. \
     Respond only with a comma-separated list of numbers.";

const ARTICLE_SYSTEM_PROMPT: &str = "You are a helpful assistant that generates short articles.";

const ARTICLE_USER_PROMPT: &str = "Generate a short article about a random topic. \
     Include a title, a body of a few paragraphs, and a conclusion.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CountWordsRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountWordsResponse {
    pub top_words: Vec<WordCount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmCountRequest {
    pub text: String,
    pub words: Vec<String>,
    pub model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmCountResponse {
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleResponse {
    pub article: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleArticleResponse {
    pub article: String,
    pub source: &'static str,
    pub title: &'static str,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct CounterService<C> {
    client: C,
    limits: LimitsConfig,
    provider: ProviderConfig,
}

impl<C: CompletionClient> CounterService<C> {
    pub fn new(client: C, limits: LimitsConfig, provider: ProviderConfig) -> Self {
        Self {
            client,
            limits,
            provider,
        }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Ground-truth top words with no length filter.
    pub fn count_words(&self, text: &str) -> CountWordsResponse {
        CountWordsResponse {
            top_words: frequency::top_words(text),
        }
    }

    /// Ask a model to count `words` in `text`.
    ///
    /// Always returns exactly `words.len()` counts on success; a malformed
    /// reply is padded rather than rejected.
    pub async fn llm_count(&self, request: &LlmCountRequest) -> Result<LlmCountResponse> {
        let model = self.validate(request)?;
        if request.words.is_empty() {
            return Ok(LlmCountResponse { counts: Vec::new() });
        }

        let completion = CompletionRequest {
            model,
            system: COUNT_SYSTEM_PROMPT.to_string(),
            user: count_prompt(&request.words, &request.text),
            temperature: 0.0,
            max_tokens: self.provider.count_max_tokens,
        };
        info!(model = model.id, words = request.words.len(), "requesting model counts");
        let reply = self.client.complete(completion).await?;

        let reconciled = reconcile_counts(&reply, request.words.len());
        if reconciled.malformed {
            warn!(model = model.id, reply = %reply.trim(), "model reply did not match expected format");
        }
        Ok(LlmCountResponse {
            counts: reconciled.counts,
        })
    }

    /// Have the article model write a short multi-section article.
    pub async fn generate_article(&self) -> Result<ArticleResponse> {
        let model = models::find_model(&self.provider.article_model)
            .ok_or_else(|| LlmCountError::unsupported_model(&self.provider.article_model))?;
        let completion = CompletionRequest {
            model,
            system: ARTICLE_SYSTEM_PROMPT.to_string(),
            user: ARTICLE_USER_PROMPT.to_string(),
            temperature: 0.7,
            max_tokens: self.provider.article_max_tokens,
        };
        info!(model = model.id, "generating article");
        let article = self.client.complete(completion).await?;
        Ok(ArticleResponse {
            article: article.trim().to_string(),
        })
    }

    /// Return one of the built-in sample articles.
    pub fn crawl_article<R: Rng + ?Sized>(&self, rng: &mut R) -> SampleArticleResponse {
        let picked = articles::pick_article(rng);
        SampleArticleResponse {
            article: picked.formatted(),
            source: "sample",
            title: picked.title,
        }
    }

    fn validate(&self, request: &LlmCountRequest) -> Result<&'static ModelInfo> {
        let chars = request.text.chars().count();
        if chars > self.limits.max_text_chars {
            return Err(LlmCountError::too_large(
                "text",
                chars,
                self.limits.max_text_chars,
            ));
        }
        if request.words.len() > self.limits.max_words {
            return Err(LlmCountError::validation(
                "words",
                format!(
                    "at most {} words can be counted, got {}",
                    self.limits.max_words,
                    request.words.len()
                ),
            ));
        }
        if request.words.iter().any(|w| w.trim().is_empty()) {
            return Err(LlmCountError::validation("words", "words must not be empty"));
        }
        models::find_model(&request.model)
            .ok_or_else(|| LlmCountError::unsupported_model(&request.model))
    }
}

/// User message asking for counts of `words` in `text`.
pub fn count_prompt(words: &[String], text: &str) -> String {
    format!(
        "Count the occurrences of the following words in the given text. \
         Only return the counts as a comma-separated list of numbers, in the same order as the words.\n\n\
         Words: {}\n\nText: {}",
        words.join(", "),
        text
    )
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::provider::{CompletionClient, CompletionRequest, ProviderError};

    /// Replays canned replies and records what it was asked.
    #[derive(Default)]
    pub struct ScriptedClient {
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
        calls: AtomicUsize,
    }

    impl ScriptedClient {
        pub fn replying(replies: impl IntoIterator<Item = Result<String, ProviderError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_request(&self) -> Option<CompletionRequest> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProviderError::EmptyResponse))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
