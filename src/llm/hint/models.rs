use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;


#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredHint {
    pub category: Option<String>,
    pub follower_filter: Option<String>,
    /// Advisory only; ranking always orders by score.
    pub sort_by: Option<String>,
}

impl StructuredHint {
    /// Picks the three known fields out of a decoded object.
    ///
    /// Null, blank and missing values are unset. Numbers and booleans are
    /// stringified; nested values are ignored. Unknown keys are dropped.
    pub fn from_object(object: &serde_json::Map<String, Value>) -> Self {
        Self {
            category: field(object, "category"),
            follower_filter: field(object, "follower_filter"),
            sort_by: field(object, "sort_by"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.follower_filter.is_none() && self.sort_by.is_none()
    }
}

fn field(object: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    let text = match object.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}


#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HintError {
    #[error("Query interpreter unavailable (no credential or endpoint configured)")]
    InterpreterUnavailable,

    #[error("Query interpreter error: {0}")]
    InterpreterError(String),

    #[error("Interpreter response contained no structured object: {raw}")]
    UnstructuredResponse { raw: String },

    #[error("Interpreter returned a malformed hint: {raw}")]
    MalformedHint { raw: String },
}
