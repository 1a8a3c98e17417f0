

use std::sync::Arc;
use tracing::{info, warn};

use super::providers::base::LlmProvider;
use super::providers::fallback::LlmProviderWithFallback;
use super::providers::ollama::OllamaProvider;
use super::providers::together::TogetherProvider;
use crate::DEFAULT_OLLAMA_URL;
use crate::core::config::InsightConfig;
use crate::core::error::{InsightError, Result};


pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Builds the query interpreter described by `config`.
    ///
    /// Returns `Ok(None)` when the interpreter is unconfigured, e.g. the
    /// Together backend without an API key. Unknown provider names are a
    /// configuration error.
    pub fn from_config(config: &InsightConfig) -> Result<Option<Arc<dyn LlmProvider>>> {
        let timeout = config.llm_timeout();

        let primary: Option<Arc<dyn LlmProvider>> = match config.llm_provider.as_str() {
            "together" => match config.llm_api_key.as_deref() {
                Some(key) => {
                    let provider = TogetherProvider::new(
                        key,
                        config.llm_model.clone(),
                        config.llm_base_url.clone(),
                        timeout,
                    )
                    .map_err(|e| InsightError::Config(e.to_string()))?;
                    Some(Arc::new(provider) as Arc<dyn LlmProvider>)
                }
                None => {
                    warn!("Together API key not found; interpreter unavailable");
                    None
                }
            },
            "ollama" => {
                let provider = OllamaProvider::new(
                    config.llm_base_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL),
                    config.llm_model.clone(),
                    timeout,
                )
                .map_err(|e| InsightError::Config(e.to_string()))?;
                Some(Arc::new(provider) as Arc<dyn LlmProvider>)
            }
            other => {
                return Err(InsightError::Config(format!(
                    "Unknown provider: {other}. Supported: together, ollama"
                )));
            }
        };

        if !config.llm_fallback_enabled {
            return Ok(primary);
        }

        let fallback: Arc<dyn LlmProvider> = Arc::new(
            OllamaProvider::new(
                config.llm_fallback_url.clone(),
                config.llm_fallback_model.clone(),
                timeout,
            )
            .map_err(|e| InsightError::Config(e.to_string()))?,
        );

        Ok(Some(match primary {
            Some(primary) => {
                Arc::new(LlmProviderWithFallback::new(primary, fallback)) as Arc<dyn LlmProvider>
            }
            None => {
                info!("Primary interpreter unconfigured, using local fallback only");
                fallback
            }
        }))
    }
}
