

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::WeightVector;
use super::pipeline::QueryRequest;
use crate::core::config::InsightConfig;


pub const HISTORY_DISPLAY_LIMIT: usize = 5;


pub const EXAMPLE_QUERIES: [&str; 4] = [
    "Show me the top fashion creators with >10000 followers",
    "List wellness creators with high engagement",
    "Find tech creators for my campaign",
    "Top creators in beauty with >5000 followers",
];


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub query: String,
    pub asked_at: DateTime<Utc>,
}


/// Remembered choices a front end carries between queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPreferences {
    pub weights: WeightVector,
    pub use_interpreter: bool,
    pub category: Option<String>,
    pub follower_filter: Option<String>,
}

impl Default for SessionPreferences {
    fn default() -> Self {
        Self {
            weights: WeightVector::default(),
            use_interpreter: false,
            category: None,
            follower_filter: None,
        }
    }
}

impl SessionPreferences {
    pub fn from_config(config: &InsightConfig) -> crate::Result<Self> {
        Ok(Self {
            weights: config.weights()?,
            use_interpreter: config.llm_enabled,
            ..Default::default()
        })
    }
}


/// Per-user state owned by the caller. The pipeline only reads it.
#[derive(Debug, Clone, Default)]
pub struct QuerySession {
    history: Vec<HistoryEntry>,
    preferences: SessionPreferences,
}

impl QuerySession {
    pub fn new(preferences: SessionPreferences) -> Self {
        Self {
            history: Vec::new(),
            preferences,
        }
    }

    /// Appends `query` unless it repeats the previous one. Returns whether it
    /// was recorded.
    pub fn record_query(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() || self.history.last().is_some_and(|last| last.query == query) {
            return false;
        }
        self.history.push(HistoryEntry {
            query: query.to_string(),
            asked_at: Utc::now(),
        });
        true
    }

    /// Newest first.
    pub fn recent(&self, limit: usize) -> Vec<&HistoryEntry> {
        self.history.iter().rev().take(limit).collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn preferences(&self) -> &SessionPreferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut SessionPreferences {
        &mut self.preferences
    }

    pub fn request(&self, query: &str) -> QueryRequest {
        QueryRequest {
            query: query.to_string(),
            category: self.preferences.category.clone(),
            follower_filter: self.preferences.follower_filter.clone(),
            weights: self.preferences.weights,
            use_interpreter: self.preferences.use_interpreter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consecutive_duplicates_are_skipped() {
        let mut session = QuerySession::default();
        assert!(session.record_query("fashion"));
        assert!(!session.record_query("fashion"));
        assert!(session.record_query("tech"));
        assert!(session.record_query("fashion"));
        assert!(!session.record_query("   "));
        assert_eq!(session.history_len(), 3);
    }

    #[test]
    fn test_recent_is_newest_first_and_bounded() {
        let mut session = QuerySession::default();
        for i in 0..8 {
            session.record_query(&format!("q{i}"));
        }
        let recent: Vec<&str> = session
            .recent(HISTORY_DISPLAY_LIMIT)
            .iter()
            .map(|e| e.query.as_str())
            .collect();
        assert_eq!(recent, vec!["q7", "q6", "q5", "q4", "q3"]);
    }

    #[test]
    fn test_request_carries_preferences() {
        let mut session = QuerySession::default();
        session.preferences_mut().category = Some("Tech".to_string());
        session.preferences_mut().use_interpreter = true;

        let request = session.request(EXAMPLE_QUERIES[2]);
        assert_eq!(request.query, "Find tech creators for my campaign");
        assert_eq!(request.category.as_deref(), Some("Tech"));
        assert!(request.use_interpreter);
        assert_eq!(request.weights, WeightVector::default());
    }
}
