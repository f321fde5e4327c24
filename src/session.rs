//! Client-side analysis session.
//!
//! Holds the text being analysed, its ground-truth ranking, the selected
//! model and that model's latest counts. Quota-consuming actions go through
//! the daily [`QuotaGate`]; count requests also go through an
//! [`IntervalGuard`] that drops rapid repeats.

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::clock::Clock;
use crate::config::Config;
use crate::error::{LlmCountError, Result};
use crate::frequency::{self, RankPolicy, WordCount};
use crate::models::{self, ModelInfo};
use crate::provider::CompletionClient;
use crate::quota::{IntervalGuard, QuotaGate, UsageStore};
use crate::scoring::{self, ComparisonReport};
use crate::service::{CounterService, LlmCountRequest};

/// What happened to a count request.
#[derive(Debug, Clone, PartialEq)]
pub enum CountOutcome {
    /// Arrived inside the minimum interval; nothing was sent or changed.
    Dropped,
    /// The model answered and the counts were stored.
    Completed(ComparisonReport),
}

pub struct Session<C> {
    service: CounterService<C>,
    clock: Arc<dyn Clock>,
    quota: QuotaGate,
    guard: IntervalGuard,
    policy: RankPolicy,
    model: &'static ModelInfo,
    text: String,
    ranking: Vec<WordCount>,
    model_counts: Vec<u64>,
}

impl<C: CompletionClient> Session<C> {
    pub fn new(
        service: CounterService<C>,
        config: &Config,
        clock: Arc<dyn Clock>,
        store: Box<dyn UsageStore>,
    ) -> Result<Self> {
        let model = models::find_model(&config.provider.default_model)
            .ok_or_else(|| LlmCountError::unsupported_model(&config.provider.default_model))?;
        Ok(Self {
            service,
            quota: QuotaGate::new(clock.clone(), store, config.limits.daily_quota),
            guard: IntervalGuard::from_millis(config.limits.min_interval_ms),
            clock,
            policy: config.rank_policy(),
            model,
            text: String::new(),
            ranking: Vec::new(),
            model_counts: Vec::new(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ranking(&self) -> &[WordCount] {
        &self.ranking
    }

    pub fn model_counts(&self) -> &[u64] {
        &self.model_counts
    }

    pub fn model(&self) -> &'static ModelInfo {
        self.model
    }

    pub fn quota(&self) -> &QuotaGate {
        &self.quota
    }

    /// Replace the text, rank it, and clear any previous model counts.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.ranking = frequency::rank(&self.text, self.policy);
        self.model_counts = vec![0; self.ranking.len()];
        debug!(words = self.ranking.len(), "ranked text");
    }

    pub fn select_model(&mut self, id: &str) -> Result<()> {
        self.model = models::find_model(id).ok_or_else(|| LlmCountError::unsupported_model(id))?;
        Ok(())
    }

    /// Ask the selected model to count the ranked words.
    ///
    /// With nothing ranked there is nothing to ask, so no call is made and
    /// no quota is used.
    pub async fn request_counts(&mut self) -> Result<CountOutcome> {
        if self.ranking.is_empty() {
            debug!("no ranked words; skipping model request");
            return Ok(CountOutcome::Completed(self.report()));
        }
        if !self.guard.admit(self.clock.now()) {
            debug!("count request dropped by interval guard");
            return Ok(CountOutcome::Dropped);
        }
        self.quota.check()?;

        let request = LlmCountRequest {
            text: self.text.clone(),
            words: self.ranking.iter().map(|w| w.word.clone()).collect(),
            model: self.model.id.to_string(),
        };
        let response = self.service.llm_count(&request).await?;
        self.quota.record_use()?;
        self.model_counts = response.counts;
        Ok(CountOutcome::Completed(self.report()))
    }

    /// Replace the text with a model-written article.
    pub async fn generate_article(&mut self) -> Result<()> {
        self.quota.check()?;
        let response = self.service.generate_article().await?;
        self.quota.record_use()?;
        self.set_text(response.article);
        Ok(())
    }

    /// Replace the text with a built-in sample article; returns its title.
    pub fn load_sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &'static str {
        let sample = self.service.crawl_article(rng);
        self.set_text(sample.article);
        sample.title
    }

    /// Current comparison of ranking and model counts.
    pub fn report(&self) -> ComparisonReport {
        scoring::compare(&self.ranking, &self.model_counts, self.model.id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
