

use thiserror::Error;


#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl InsightError {
    pub fn data_source(row: usize, message: impl std::fmt::Display) -> Self {
        Self::DataSource(format!("row {}: {}", row, message))
    }
}

impl From<config::ConfigError> for InsightError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}


pub type Result<T> = std::result::Result<T, InsightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_error_names_row() {
        let err = InsightError::data_source(7, "follower_count is not an integer");
        assert_eq!(
            err.to_string(),
            "Data source error: row 7: follower_count is not an integer"
        );
    }
}
