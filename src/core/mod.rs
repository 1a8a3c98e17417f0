

pub mod config;
pub mod error;

pub use config::InsightConfig;
pub use error::{InsightError, Result};
