use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::core::generator::GeneratorSettings;
use crate::models::ScoringWeights;
use crate::services::CompletionOptions;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub listings: ListingSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: String::new(),
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_llm_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_model() -> String { "gpt-3.5-turbo".to_string() }
fn default_max_tokens() -> u32 { 500 }
fn default_timeout_secs() -> u64 { 30 }
fn default_retry_backoff_ms() -> u64 { 500 }
fn default_max_concurrency() -> usize { 4 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_max_description_chars")]
    pub max_description_chars: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            max_description_chars: default_max_description_chars(),
        }
    }
}

fn default_limit() -> usize { 5 }
fn default_max_limit() -> usize { 50 }
fn default_max_description_chars() -> usize { 600 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_budget_weight")]
    pub budget: f64,
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_features_weight")]
    pub features: f64,
    #[serde(default = "default_rooms_weight")]
    pub rooms: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            budget: default_budget_weight(),
            location: default_location_weight(),
            features: default_features_weight(),
            rooms: default_rooms_weight(),
        }
    }
}

fn default_budget_weight() -> f64 { 0.35 }
fn default_location_weight() -> f64 { 0.25 }
fn default_features_weight() -> f64 { 0.30 }
fn default_rooms_weight() -> f64 { 0.10 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingSettings {
    /// JSON file of listings loaded at startup
    pub seed_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_cache_capacity() -> u64 { 1000 }
fn default_cache_ttl_secs() -> u64 { 3600 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with HOMEMATCH_)
    /// 5. OPENAI_API_KEY / OPENAI_BASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., HOMEMATCH__LLM__MODEL -> llm.model
            .add_source(
                Environment::with_prefix("HOMEMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("HOMEMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights {
            budget: self.scoring.weights.budget,
            location: self.scoring.weights.location,
            features: self.scoring.weights.features,
            rooms: self.scoring.weights.rooms,
        }
    }

    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            options: CompletionOptions {
                model: self.llm.model.clone(),
                temperature: self.llm.temperature,
                max_tokens: self.llm.max_tokens,
            },
            max_chars: self.matching.max_description_chars,
            timeout: Duration::from_secs(self.llm.timeout_secs),
            retry_backoff: Duration::from_millis(self.llm.retry_backoff_ms),
        }
    }
}

/// Apply the provider's conventional environment variables
///
/// OPENAI_API_KEY is only used when no HOMEMATCH__LLM__API_KEY was given.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let explicit_key = env::var("HOMEMATCH__LLM__API_KEY").ok();
    let api_key = explicit_key.or_else(|| env::var("OPENAI_API_KEY").ok());
    let base_url = env::var("OPENAI_BASE_URL").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(api_key) = api_key {
        builder = builder.set_override("llm.api_key", api_key)?;
    }
    if let Some(base_url) = base_url {
        builder = builder.set_override("llm.base_url", base_url)?;
    }

    builder.build()
}
