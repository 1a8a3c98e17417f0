

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::extract::decode_hint;
use super::models::{HintError, StructuredHint};
use super::prompt::build_hint_prompt;
use crate::core::config::InsightConfig;
use crate::llm::providers::base::{CompletionRequest, LlmProvider, LlmProviderError};


#[derive(Clone)]
pub struct HintParser {
    provider: Option<Arc<dyn LlmProvider>>,
    max_tokens: u32,
    temperature: f64,
    timeout: Duration,
    max_retries: u32,
}

impl HintParser {

    pub fn new(provider: Option<Arc<dyn LlmProvider>>) -> Self {
        Self {
            provider,
            max_tokens: 100,
            temperature: 0.0,
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }


    pub fn from_config(provider: Option<Arc<dyn LlmProvider>>, config: &InsightConfig) -> Self {
        Self {
            provider,
            max_tokens: config.llm_max_tokens,
            temperature: config.llm_temperature,
            timeout: config.llm_timeout(),
            max_retries: config.llm_max_retries,
        }
    }


    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }


    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }


    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Asks the interpreter for `{category, follower_filter, sort_by}`.
    ///
    /// Every failure maps onto a [`HintError`]; callers fall back to
    /// substring resolution.
    pub async fn parse_hint(&self, query: &str) -> Result<StructuredHint, HintError> {
        let provider = self.provider.as_ref().ok_or(HintError::InterpreterUnavailable)?;

        let request = CompletionRequest {
            prompt: build_hint_prompt(query),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let text = self.call_interpreter(provider.as_ref(), &request).await?;
        debug!("Interpreter response: {}", crate::safe_truncate_ellipsis(&text, 200));

        let hint = decode_hint(&text).inspect_err(|e| {
            warn!("Hint extraction failed: {}", crate::safe_truncate_ellipsis(&e.to_string(), 200));
        })?;

        info!(
            "Interpreter hint: category={:?}, follower_filter={:?}, sort_by={:?}",
            hint.category, hint.follower_filter, hint.sort_by
        );
        Ok(hint)
    }

    /// One outstanding call at a time; transport failures and timeouts are
    /// retried up to `max_retries` times.
    async fn call_interpreter(
        &self,
        provider: &dyn LlmProvider,
        request: &CompletionRequest,
    ) -> Result<String, HintError> {
        let attempts = self.max_retries.saturating_add(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.timeout, provider.complete(request)).await {
                Ok(Ok((text, metadata))) => {
                    debug!(
                        "Interpreter {}/{} answered (attempt {}, tokens={:?}, fallback={})",
                        metadata.provider,
                        metadata.model,
                        attempt,
                        metadata.tokens_total,
                        metadata.fallback_used
                    );
                    return Ok(text);
                }
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => last_error = LlmProviderError::Timeout(self.timeout.as_secs()).to_string(),
            }
            warn!(
                "Interpreter {} attempt {}/{} failed: {}",
                provider.provider_name(),
                attempt,
                attempts,
                last_error
            );
        }

        Err(HintError::InterpreterError(last_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::base::LlmMetadata;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Behavior {
        Reply(&'static str),
        Fail,
        Hang,
    }

    struct StubInterpreter {
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl StubInterpreter {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for StubInterpreter {
        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<(String, LlmMetadata), LlmProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(request.temperature, 0.0);
            match self.behavior {
                Behavior::Reply(text) => Ok((text.to_string(), LlmMetadata::default())),
                Behavior::Fail => Err(LlmProviderError::Provider("503".to_string())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok((String::new(), LlmMetadata::default()))
                }
            }
        }

        fn provider_name(&self) -> &str {
            "stub"
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    #[tokio::test]
    async fn test_unconfigured_is_unavailable() {
        let parser = HintParser::new(None);
        assert!(!parser.is_available());
        assert_eq!(
            parser.parse_hint("fashion").await.unwrap_err(),
            HintError::InterpreterUnavailable
        );
    }

    #[tokio::test]
    async fn test_parses_noisy_reply() {
        let stub = StubInterpreter::new(Behavior::Reply(
            "Output: {\"category\":\"fashion\",\"follower_filter\":\">10000\",\"sort_by\":\"engagement rate\"}\nInput: ...",
        ));
        let parser = HintParser::new(Some(stub.clone()));

        let hint = parser.parse_hint("top fashion creators with >10000 followers").await.unwrap();
        assert_eq!(hint.category.as_deref(), Some("fashion"));
        assert_eq!(hint.follower_filter.as_deref(), Some(">10000"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unstructured_reply_is_not_retried() {
        let stub = StubInterpreter::new(Behavior::Reply("no idea"));
        let parser = HintParser::new(Some(stub.clone()));

        let err = parser.parse_hint("anything").await.unwrap_err();
        assert!(matches!(err, HintError::UnstructuredResponse { .. }));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_retried_then_reported() {
        let stub = StubInterpreter::new(Behavior::Fail);
        let parser = HintParser::new(Some(stub.clone())).with_max_retries(2);

        let err = parser.parse_hint("anything").await.unwrap_err();
        assert_eq!(err, HintError::InterpreterError("Provider error: 503".to_string()));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_interpreter_error() {
        let stub = StubInterpreter::new(Behavior::Hang);
        let parser = HintParser::new(Some(stub.clone()))
            .with_timeout(Duration::from_secs(5))
            .with_max_retries(1);

        let err = parser.parse_hint("anything").await.unwrap_err();
        assert_eq!(err, HintError::InterpreterError("Request timed out after 5s".to_string()));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unbounded_retry_setting_still_calls_once() {
        let stub = StubInterpreter::new(Behavior::Reply("{\"category\": \"tech\"}"));
        let parser = HintParser::new(Some(stub.clone())).with_max_retries(u32::MAX);

        let hint = parser.parse_hint("q").await.unwrap();
        assert_eq!(hint.category.as_deref(), Some("tech"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }
}
