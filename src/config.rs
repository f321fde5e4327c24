use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{LlmCountError, Result};
use crate::frequency::{RankPolicy, DEFAULT_TOP_K, MAX_TOP_K};
use crate::models;
use crate::quota::{DEFAULT_DAILY_QUOTA, DEFAULT_MIN_INTERVAL_MS};

/// Top-level configuration for llmcount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub limits: LimitsConfig,
    pub ranking: RankingConfig,
    pub provider: ProviderConfig,
    pub usage: UsageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum characters of text sent to a model.
    pub max_text_chars: usize,
    /// Maximum words a model is asked to count.
    pub max_words: usize,
    /// Maximum request body accepted by the server.
    pub max_body_bytes: usize,
    /// Quota-consuming actions allowed per day (client side).
    pub daily_quota: u32,
    /// Minimum spacing between count requests (client side).
    pub min_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RankingConfig {
    pub top_k: usize,
    pub min_token_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub default_model: String,
    pub article_model: String,
    pub timeout_secs: u64,
    pub count_max_tokens: u32,
    pub article_max_tokens: u32,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub google_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct UsageConfig {
    /// Where the client keeps its daily usage counter.
    pub state_file: Option<PathBuf>,
}

// --- Defaults ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_text_chars: 10_000,
            max_words: 20,
            max_body_bytes: 50 * 1024,
            daily_quota: DEFAULT_DAILY_QUOTA,
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_token_len: 0,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            default_model: models::DEFAULT_MODEL.into(),
            article_model: models::DEFAULT_MODEL.into(),
            timeout_secs: 30,
            count_max_tokens: 100,
            article_max_tokens: 500,
            openai_base_url: "https://api.openai.com/v1".into(),
            anthropic_base_url: "https://api.anthropic.com/v1".into(),
            google_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
        }
    }
}

// --- Config methods ---

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LlmCountError::io(format!("reading config from '{}'", path.display()), e)
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| LlmCountError::config_with_source("failed to parse config", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path or the discovered file, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            if !p.exists() {
                return Err(LlmCountError::config(format!(
                    "config file '{}' does not exist",
                    p.display()
                )));
            }
        }
        match find_config_file(explicit) {
            Some(p) => Self::load(&p),
            None => Ok(Self::default()),
        }
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| LlmCountError::config_with_source("failed to serialize config", e))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LlmCountError::io(
                    format!("creating config directory '{}'", parent.display()),
                    e,
                )
            })?;
        }
        std::fs::write(path, content).map_err(|e| {
            LlmCountError::io(format!("writing config to '{}'", path.display()), e)
        })
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_text_chars == 0 {
            return Err(LlmCountError::validation(
                "limits.max_text_chars",
                "must be greater than 0",
            ));
        }
        if self.limits.max_body_bytes == 0 {
            return Err(LlmCountError::validation(
                "limits.max_body_bytes",
                "must be greater than 0",
            ));
        }
        if self.ranking.top_k == 0 {
            return Err(LlmCountError::validation(
                "ranking.top_k",
                "must be greater than 0",
            ));
        }
        if self.ranking.top_k > MAX_TOP_K {
            return Err(LlmCountError::validation(
                "ranking.top_k",
                format!("must be at most {MAX_TOP_K}"),
            ));
        }
        if self.ranking.top_k > self.limits.max_words {
            return Err(LlmCountError::validation(
                "ranking.top_k",
                "must not exceed limits.max_words",
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(LlmCountError::validation(
                "provider.timeout_secs",
                "must be greater than 0",
            ));
        }
        for (field, id) in [
            ("provider.default_model", &self.provider.default_model),
            ("provider.article_model", &self.provider.article_model),
        ] {
            if models::find_model(id).is_none() {
                return Err(LlmCountError::validation(
                    field,
                    format!("unknown model '{id}'"),
                ));
            }
        }
        Ok(())
    }

    /// Ranking policy for client-side analysis.
    pub fn rank_policy(&self) -> RankPolicy {
        RankPolicy {
            top_k: self.ranking.top_k,
            min_len: self.ranking.min_token_len,
        }
    }

    /// Usage file location: configured path, else the user data dir.
    pub fn usage_path(&self) -> PathBuf {
        if let Some(ref p) = self.usage.state_file {
            return p.clone();
        }
        ProjectDirs::from("", "", "llmcount")
            .map(|d| d.data_dir().join("usage.json"))
            .unwrap_or_else(|| PathBuf::from(".llmcount").join("usage.json"))
    }
}

/// Builder for constructing Config with selective overrides.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_daily_quota(mut self, quota: u32) -> Self {
        self.config.limits.daily_quota = quota;
        self
    }

    pub fn with_min_interval_ms(mut self, ms: u64) -> Self {
        self.config.limits.min_interval_ms = ms;
        self
    }

    pub fn with_usage_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.usage.state_file = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Discover the config file using standard search order:
/// 1. Explicit path (if provided)
/// 2. ./llmcount.toml
/// 3. ~/.llmcount.toml
/// 4. XDG config dir
pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        if p.exists() {
            return Some(p.to_path_buf());
        }
        return None;
    }

    let local = PathBuf::from("llmcount.toml");
    if local.exists() {
        return Some(local);
    }

    if let Some(home) = dirs_home() {
        let home_config = home.join(".llmcount.toml");
        if home_config.exists() {
            return Some(home_config);
        }
    }

    if let Some(proj_dirs) = ProjectDirs::from("", "", "llmcount") {
        let xdg = proj_dirs.config_dir().join("llmcount.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }

    None
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn serde_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.server.host, "127.0.0.1");
        assert_eq!(parsed.limits.daily_quota, 100);
    }

    #[test]
    fn validation_rejects_top_k_above_word_limit() {
        let mut config = Config::default();
        config.ranking.top_k = 5;
        config.limits.max_words = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_caps_top_k_at_ten() {
        let mut config = Config::default();
        config.ranking.top_k = 10;
        assert!(config.validate().is_ok());
        config.ranking.top_k = 11;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most 10"));
    }

    #[test]
    fn validation_rejects_unknown_model() {
        let mut config = Config::default();
        config.provider.default_model = "gpt-99".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("gpt-99"));
    }

    #[test]
    fn builder_overrides() {
        let config = ConfigBuilder::new()
            .with_port(9000)
            .with_daily_quota(5)
            .with_min_interval_ms(0)
            .build()
            .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.limits.daily_quota, 5);
        assert_eq!(config.limits.min_interval_ms, 0);
    }

    #[test]
    fn usage_path_prefers_configured_file() {
        let config = ConfigBuilder::new()
            .with_usage_file("/tmp/usage.json")
            .build()
            .unwrap();
        assert_eq!(config.usage_path(), PathBuf::from("/tmp/usage.json"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("llmcount.toml");
        let config = Config::default();
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn discover_errors_on_missing_explicit_file() {
        let err = Config::discover(Some(Path::new("/nonexistent/llmcount.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
