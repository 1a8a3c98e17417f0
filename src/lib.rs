

pub mod core;
pub mod llm;
pub mod mcp;
pub mod toolkit;
pub mod utils;

pub use utils::{safe_truncate, safe_truncate_ellipsis};


pub use core::config::InsightConfig;
pub use core::error::{InsightError, Result};
pub use llm::{HintParser, LlmProviderFactory};
pub use toolkit::creator_search::{
    CreatorDataset, QueryOutcome, QueryPipeline, QueryRequest, QuerySession, WeightVector,
};


pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";


pub const DEFAULT_LLM_MODEL: &str = "mistralai/Mixtral-8x7B-Instruct-v0.1";


pub const DEFAULT_DATA_PATH: &str = "Mock_Creator_Engagement_Data.csv";


pub const DEFAULT_EXPORT_PATH: &str = "ranked_creators.csv";
