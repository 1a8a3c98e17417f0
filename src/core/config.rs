

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::error::{InsightError, Result};
use crate::toolkit::creator_search::WeightVector;
use crate::{DEFAULT_DATA_PATH, DEFAULT_EXPORT_PATH, DEFAULT_LLM_MODEL, DEFAULT_OLLAMA_URL};


const ENV_PREFIX: &str = "CREATOR_INSIGHT";


const MAX_LLM_RETRIES: u32 = 10;


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {

    pub data_path: String,
    pub export_path: String,


    pub llm_enabled: bool,
    pub llm_provider: String,
    pub llm_model: String,
    #[serde(skip_serializing)]
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_temperature: f64,
    pub llm_max_tokens: u32,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,


    pub llm_fallback_enabled: bool,
    pub llm_fallback_url: String,
    pub llm_fallback_model: String,


    pub weight_engagement: f64,
    pub weight_followers: f64,
    pub weight_likes: f64,


    pub detail_limit: usize,
    pub table_limit: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            data_path: DEFAULT_DATA_PATH.to_string(),
            export_path: DEFAULT_EXPORT_PATH.to_string(),

            llm_enabled: false,
            llm_provider: "together".to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_api_key: None,
            llm_base_url: None,
            llm_temperature: 0.0,
            llm_max_tokens: 100,
            llm_timeout_secs: 30,
            llm_max_retries: 2,

            llm_fallback_enabled: false,
            llm_fallback_url: DEFAULT_OLLAMA_URL.to_string(),
            llm_fallback_model: "llama3.2".to_string(),

            weight_engagement: 0.5,
            weight_followers: 0.3,
            weight_likes: 0.2,

            detail_limit: 5,
            table_limit: 10,
        }
    }
}

impl InsightConfig {
    /// Builds a config from `CREATOR_INSIGHT_*` variables on top of the defaults.
    ///
    /// `TOGETHER_API_KEY` is honored as the interpreter credential when no
    /// prefixed key is set.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("CREATOR_INSIGHT_DATA_PATH") {
            config.data_path = path;
        }
        if let Ok(path) = std::env::var("CREATOR_INSIGHT_EXPORT_PATH") {
            config.export_path = path;
        }
        if let Some(enabled) = env_bool("CREATOR_INSIGHT_LLM_ENABLED") {
            config.llm_enabled = enabled;
        }
        if let Ok(provider) = std::env::var("CREATOR_INSIGHT_LLM_PROVIDER") {
            config.llm_provider = provider;
        }
        if let Ok(model) = std::env::var("CREATOR_INSIGHT_LLM_MODEL") {
            config.llm_model = model;
        }
        if let Ok(url) = std::env::var("CREATOR_INSIGHT_LLM_BASE_URL") {
            config.llm_base_url = Some(url);
        }
        if let Some(timeout) = env_parse("CREATOR_INSIGHT_LLM_TIMEOUT_SECS") {
            config.llm_timeout_secs = timeout;
        }
        if let Some(retries) = env_parse("CREATOR_INSIGHT_LLM_MAX_RETRIES") {
            config.llm_max_retries = retries;
        }
        if let Some(enabled) = env_bool("CREATOR_INSIGHT_LLM_FALLBACK_ENABLED") {
            config.llm_fallback_enabled = enabled;
        }
        if let Ok(url) = std::env::var("CREATOR_INSIGHT_LLM_FALLBACK_URL") {
            config.llm_fallback_url = url;
        }
        if let Ok(model) = std::env::var("CREATOR_INSIGHT_LLM_FALLBACK_MODEL") {
            config.llm_fallback_model = model;
        }
        if let Some(weight) = env_parse("CREATOR_INSIGHT_WEIGHT_ENGAGEMENT") {
            config.weight_engagement = weight;
        }
        if let Some(weight) = env_parse("CREATOR_INSIGHT_WEIGHT_FOLLOWERS") {
            config.weight_followers = weight;
        }
        if let Some(weight) = env_parse("CREATOR_INSIGHT_WEIGHT_LIKES") {
            config.weight_likes = weight;
        }

        config.llm_api_key = std::env::var("CREATOR_INSIGHT_LLM_API_KEY")
            .or_else(|_| std::env::var("TOGETHER_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());

        config
    }

    /// Layers an optional config file (any format the `config` crate detects
    /// from the extension) and the `CREATOR_INSIGHT_*` environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX).try_parsing(true),
        );

        let mut config: Self = builder.build()?.try_deserialize()?;
        if config.llm_api_key.is_none() {
            config.llm_api_key = std::env::var("TOGETHER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights()?;

        for raw in self.llm_base_url.iter().chain(std::iter::once(&self.llm_fallback_url)) {
            url::Url::parse(raw)
                .map_err(|e| InsightError::Config(format!("invalid URL '{}': {}", raw, e)))?;
        }

        if self.llm_max_tokens == 0 {
            return Err(InsightError::Config("llm_max_tokens must be positive".to_string()));
        }
        if self.llm_timeout_secs == 0 {
            return Err(InsightError::Config("llm_timeout_secs must be positive".to_string()));
        }
        if self.llm_max_retries > MAX_LLM_RETRIES {
            return Err(InsightError::Config(format!(
                "llm_max_retries must be at most {MAX_LLM_RETRIES}, got {}",
                self.llm_max_retries
            )));
        }

        Ok(())
    }

    pub fn weights(&self) -> Result<WeightVector> {
        WeightVector::new(self.weight_engagement, self.weight_followers, self.weight_likes)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|v| match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}
