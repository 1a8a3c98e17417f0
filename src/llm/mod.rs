

pub mod factory;
pub mod hint;
pub mod providers;

pub use factory::LlmProviderFactory;
pub use hint::{HintError, HintParser, StructuredHint};
pub use providers::{LlmProvider, LlmProviderError};
