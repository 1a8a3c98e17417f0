

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use super::base::{CompletionRequest, LlmMetadata, LlmProvider, LlmProviderError};


/// Tries the primary interpreter first and a secondary one when it fails.
pub struct LlmProviderWithFallback {
    primary: Arc<dyn LlmProvider>,
    fallback: Arc<dyn LlmProvider>,
    using_fallback: AtomicBool,
    fallback_count: AtomicUsize,
    primary_failures: AtomicUsize,
}

impl LlmProviderWithFallback {

    pub fn new(primary: Arc<dyn LlmProvider>, fallback: Arc<dyn LlmProvider>) -> Self {
        info!(
            "LlmProviderWithFallback initialized: primary={}/{}, fallback={}/{}",
            primary.provider_name(),
            primary.model_name(),
            fallback.provider_name(),
            fallback.model_name()
        );

        Self {
            primary,
            fallback,
            using_fallback: AtomicBool::new(false),
            fallback_count: AtomicUsize::new(0),
            primary_failures: AtomicUsize::new(0),
        }
    }


    pub fn is_using_fallback(&self) -> bool {
        self.using_fallback.load(Ordering::SeqCst)
    }


    pub fn fallback_count(&self) -> usize {
        self.fallback_count.load(Ordering::SeqCst)
    }


    pub fn primary_failures(&self) -> usize {
        self.primary_failures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for LlmProviderWithFallback {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<(String, LlmMetadata), LlmProviderError> {
        match self.primary.complete(request).await {
            Ok(result) => {
                self.using_fallback.store(false, Ordering::SeqCst);
                self.primary_failures.store(0, Ordering::SeqCst);
                Ok(result)
            }
            Err(e) => {
                let failures = self.primary_failures.fetch_add(1, Ordering::SeqCst) + 1;
                warn!(
                    "Primary interpreter {} failed ({}x), trying {}: {}",
                    self.primary.provider_name(),
                    failures,
                    self.fallback.provider_name(),
                    e
                );

                let (content, mut metadata) = self.fallback.complete(request).await?;
                metadata.fallback_used = true;
                metadata.original_error = Some(e.to_string());

                self.using_fallback.store(true, Ordering::SeqCst);
                self.fallback_count.fetch_add(1, Ordering::SeqCst);

                Ok((content, metadata))
            }
        }
    }

    fn provider_name(&self) -> &str {
        if self.is_using_fallback() {
            self.fallback.provider_name()
        } else {
            self.primary.provider_name()
        }
    }

    fn model_name(&self) -> &str {
        if self.is_using_fallback() {
            self.fallback.model_name()
        } else {
            self.primary.model_name()
        }
    }
}
