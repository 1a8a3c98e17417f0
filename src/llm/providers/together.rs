

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use super::base::{CompletionRequest, LlmMetadata, LlmProvider, LlmProviderError};

pub const TOGETHER_BASE_URL: &str = "https://api.together.xyz/v1";

#[derive(Debug, Serialize)]
struct TogetherRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct TogetherResponse {
    #[serde(default)]
    choices: Vec<TogetherChoice>,
    usage: Option<TogetherUsage>,
}

#[derive(Debug, Deserialize)]
struct TogetherChoice {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct TogetherUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}


/// Together AI text-completions backend.
pub struct TogetherProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl TogetherProvider {

    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmProviderError> {
        let model = model.into();
        let base_url = base_url.unwrap_or_else(|| TOGETHER_BASE_URL.to_string());
        info!("Together provider initialized (model={}, url={})", model, base_url);
        Ok(Self {
            api_key: api_key.into(),
            model,
            base_url,
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl LlmProvider for TogetherProvider {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<(String, LlmMetadata), LlmProviderError> {
        let body = TogetherRequest {
            model: &self.model,
            prompt: &request.prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/completions", self.base_url.trim_end_matches('/')))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?
            .error_for_status()
            .map_err(LlmProviderError::Http)?
            .json::<TogetherResponse>()
            .await?;

        let content = response
            .choices
            .first()
            .ok_or_else(|| LlmProviderError::Provider("No choices in response".to_string()))?
            .text
            .trim()
            .to_string();

        let mut metadata = LlmMetadata {
            provider: "together".to_string(),
            model: self.model.clone(),
            base_url: Some(self.base_url.clone()),
            ..Default::default()
        };

        if let Some(usage) = response.usage {
            metadata.tokens_prompt = Some(usage.prompt_tokens);
            metadata.tokens_completion = Some(usage.completion_tokens);
            metadata.tokens_total = Some(usage.total_tokens);
        }

        Ok((content, metadata))
    }

    fn provider_name(&self) -> &str {
        "together"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
