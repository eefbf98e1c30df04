use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::aggregate::{AggregationConfig, AggregationMode};
use crate::registry::{Registry, Source};
use crate::translate::TranslationPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("duplicate source name '{0}'")]
    DuplicateSource(String),
    #[error("aggregation.max_items must be greater than zero")]
    ZeroMaxItems,
    #[error("translation.concurrency must be greater than zero")]
    ZeroConcurrency,
    #[error("refresh_interval must be greater than zero")]
    ZeroRefreshInterval,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Refresh interval in seconds
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Fixed offset used when formatting publish times. Local offset when unset.
    #[serde(default)]
    pub display_utc_offset_minutes: Option<i32>,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub sources: Vec<Source>,
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

fn default_gateway_endpoint() -> String {
    "https://api.rss2json.com/v1/api.json".to_string()
}

fn default_fetch_timeout() -> u64 {
    15
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_gateway_endpoint(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_translation_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
    #[serde(default = "default_translate_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub policy: TranslationPolicy,
    /// Upper bound on in-flight requests for the concurrent policy
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_true() -> bool {
    true
}

fn default_translation_endpoint() -> String {
    "https://api.mymemory.translated.net/get".to_string()
}

fn default_source_lang() -> String {
    "en".to_string()
}

fn default_target_lang() -> String {
    "it".to_string()
}

fn default_translate_timeout() -> u64 {
    10
}

fn default_concurrency() -> usize {
    4
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_translation_endpoint(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            timeout_secs: default_translate_timeout(),
            policy: TranslationPolicy::default(),
            concurrency: default_concurrency(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            if !seen.insert(source.name.as_str()) {
                return Err(ConfigError::DuplicateSource(source.name.clone()));
            }
        }
        if self.aggregation.max_items == 0 {
            return Err(ConfigError::ZeroMaxItems);
        }
        if self.translation.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.refresh_interval == 0 {
            return Err(ConfigError::ZeroRefreshInterval);
        }
        Ok(())
    }

    pub fn registry(&self) -> Registry {
        Registry::new(self.sources.clone())
    }

    pub fn aggregation_mode(&self) -> AggregationMode {
        self.aggregation.mode
    }
}
