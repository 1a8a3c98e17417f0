

pub mod base;
pub mod fallback;
pub mod ollama;
pub mod together;

pub use base::{CompletionRequest, LlmMetadata, LlmProvider, LlmProviderError};
pub use fallback::LlmProviderWithFallback;
pub use ollama::OllamaProvider;
pub use together::TogetherProvider;
