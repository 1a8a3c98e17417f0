

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::dataset::CreatorDataset;
use super::export;
use super::follower_filter::{normalize_follower_filter, parse_comparison};
use super::models::{FollowerFilter, ScoredRecord, WeightVector};
use super::ranking::rank;
use super::report::{self, CondensedRow, CreatorDetail};
use super::resolver::resolve_category;
use super::session::QuerySession;
use crate::core::error::Result;
use crate::llm::hint::{HintError, HintParser, StructuredHint};


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Explicit category; beats anything derived from the query text.
    pub category: Option<String>,
    /// Explicit follower filter such as `">10000"` or `"show all"`.
    pub follower_filter: Option<String>,
    pub weights: WeightVector,
    pub use_interpreter: bool,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: None,
            follower_filter: None,
            weights: WeightVector::default(),
            use_interpreter: false,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_follower_filter(mut self, filter: impl Into<String>) -> Self {
        self.follower_filter = Some(filter.into());
        self
    }

    pub fn with_weights(mut self, weights: WeightVector) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_interpreter(mut self, enabled: bool) -> Self {
        self.use_interpreter = enabled;
        self
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    Explicit,
    Interpreter,
    QueryText,
}


/// How the pipeline arrived at its filters. None of these are errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    CategorySelected { category: String, source: CategorySource },
    InterpreterUnavailable,
    InterpreterError { message: String },
    UnstructuredResponse { raw: String },
    MalformedHint { raw: String },
    HintCategoryUnknown { category: String },
    SortHintIgnored { sort_by: String },
    FollowerFilterIgnored { filter: String },
    NoCategoryMatch,
    EmptyResultSet,
}

impl Diagnostic {
    pub fn message(&self) -> String {
        match self {
            Self::CategorySelected { category, source } => match source {
                CategorySource::Explicit => format!("Using selected category: {category}"),
                CategorySource::Interpreter => format!("Interpreter detected category: {category}"),
                CategorySource::QueryText => format!("Detected category: {category}"),
            },
            Self::InterpreterUnavailable => {
                "Query interpreter unavailable, using basic extraction".to_string()
            }
            Self::InterpreterError { message } => {
                format!("Query interpreter failed ({message}), using basic extraction")
            }
            Self::UnstructuredResponse { .. } | Self::MalformedHint { .. } => {
                "Could not parse interpreter output, using basic extraction".to_string()
            }
            Self::HintCategoryUnknown { category } => {
                format!("Interpreter suggested unknown category '{category}', ignoring it")
            }
            Self::SortHintIgnored { sort_by } => {
                format!("Sort hint '{sort_by}' noted; results are always ordered by score")
            }
            Self::FollowerFilterIgnored { filter } => {
                format!("Follower filter '{filter}' not understood, showing all follower counts")
            }
            Self::NoCategoryMatch => {
                "No category detected in the query. Please select a category.".to_string()
            }
            Self::EmptyResultSet => "No creators found after applying filters.".to_string(),
        }
    }

    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::CategorySelected { .. } | Self::SortHintIgnored { .. })
    }
}

impl From<HintError> for Diagnostic {
    fn from(error: HintError) -> Self {
        match error {
            HintError::InterpreterUnavailable => Self::InterpreterUnavailable,
            HintError::InterpreterError(message) => Self::InterpreterError { message },
            HintError::UnstructuredResponse { raw } => Self::UnstructuredResponse { raw },
            HintError::MalformedHint { raw } => Self::MalformedHint { raw },
        }
    }
}


#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub query_id: Uuid,
    pub query: String,
    pub category: Option<String>,
    pub follower_filter: Option<FollowerFilter>,
    /// What the interpreter returned, when it was asked and answered.
    pub hint: Option<StructuredHint>,
    pub weights: WeightVector,
    pub ranked: Vec<ScoredRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl QueryOutcome {
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn top_details(&self, limit: usize) -> Vec<CreatorDetail> {
        report::top_details(&self.ranked, limit)
    }

    pub fn top_table(&self, limit: usize) -> Vec<CondensedRow> {
        report::top_table(&self.ranked, limit)
    }

    pub fn to_csv(&self) -> Result<String> {
        export::to_csv(&self.ranked)
    }
}


/// Turns one free-text query into a ranked result over a shared dataset.
///
/// Holds no per-user state; see [`QuerySession`].
pub struct QueryPipeline {
    dataset: Arc<CreatorDataset>,
    hint_parser: HintParser,
}

impl QueryPipeline {
    pub fn new(dataset: Arc<CreatorDataset>, hint_parser: HintParser) -> Self {
        info!(
            "🔎 QueryPipeline initialized: {} creators, {} categories, interpreter={}",
            dataset.len(),
            dataset.categories().len(),
            hint_parser.is_available()
        );
        Self {
            dataset,
            hint_parser,
        }
    }

    pub fn dataset(&self) -> &Arc<CreatorDataset> {
        &self.dataset
    }

    pub fn hint_parser(&self) -> &HintParser {
        &self.hint_parser
    }

    pub fn with_dataset(&self, dataset: Arc<CreatorDataset>) -> Self {
        Self::new(dataset, self.hint_parser.clone())
    }

    pub async fn run_in_session(&self, session: &QuerySession, query: &str) -> QueryOutcome {
        self.run(&session.request(query)).await
    }

    pub async fn run(&self, request: &QueryRequest) -> QueryOutcome {
        let query_id = Uuid::new_v4();
        let mut diagnostics = Vec::new();

        let hint = if request.use_interpreter {
            match self.hint_parser.parse_hint(&request.query).await {
                Ok(hint) => Some(hint),
                Err(e) => {
                    warn!("[{}] Falling back to substring resolution: {}", query_id, e);
                    diagnostics.push(Diagnostic::from(e));
                    None
                }
            }
        } else {
            None
        };

        let category = self.select_category(request, hint.as_ref(), &mut diagnostics);

        if let Some(sort_by) = hint.as_ref().and_then(|h| h.sort_by.clone()) {
            diagnostics.push(Diagnostic::SortHintIgnored { sort_by });
        }

        let follower_filter = self.select_follower_filter(request, hint.as_ref(), &mut diagnostics);

        let ranked = rank(
            self.dataset.records(),
            category.as_deref(),
            follower_filter,
            &request.weights,
        );
        if category.is_some() && ranked.is_empty() {
            diagnostics.push(Diagnostic::EmptyResultSet);
        }

        info!(
            "[{}] Ranked {} creators (category={:?}, filter={:?})",
            query_id,
            ranked.len(),
            category,
            follower_filter.map(|f| f.to_string())
        );

        QueryOutcome {
            query_id,
            query: request.query.clone(),
            category,
            follower_filter,
            hint,
            weights: request.weights,
            ranked,
            diagnostics,
        }
    }

    fn select_category(
        &self,
        request: &QueryRequest,
        hint: Option<&StructuredHint>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<String> {
        let explicit = request
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        if let Some(category) = explicit {
            let category = self
                .dataset
                .canonical_category(category)
                .unwrap_or(category)
                .to_string();
            diagnostics.push(Diagnostic::CategorySelected {
                category: category.clone(),
                source: CategorySource::Explicit,
            });
            return Some(category);
        }

        if let Some(suggested) = hint.and_then(|h| h.category.as_deref()) {
            match self.dataset.canonical_category(suggested) {
                Some(category) => {
                    diagnostics.push(Diagnostic::CategorySelected {
                        category: category.to_string(),
                        source: CategorySource::Interpreter,
                    });
                    return Some(category.to_string());
                }
                None => diagnostics.push(Diagnostic::HintCategoryUnknown {
                    category: suggested.to_string(),
                }),
            }
        }

        match resolve_category(&request.query, self.dataset.categories()) {
            Some(category) => {
                diagnostics.push(Diagnostic::CategorySelected {
                    category: category.clone(),
                    source: CategorySource::QueryText,
                });
                Some(category)
            }
            None => {
                diagnostics.push(Diagnostic::NoCategoryMatch);
                None
            }
        }
    }

    fn select_follower_filter(
        &self,
        request: &QueryRequest,
        hint: Option<&StructuredHint>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<FollowerFilter> {
        let text = match request.follower_filter.as_deref() {
            Some(explicit) => normalize_follower_filter(Some(explicit)),
            None => normalize_follower_filter(hint.and_then(|h| h.follower_filter.as_deref())),
        }?;

        let parsed = parse_comparison(&text);
        if parsed.is_none() {
            diagnostics.push(Diagnostic::FollowerFilterIgnored { filter: text });
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::base::{
        CompletionRequest, LlmMetadata, LlmProvider, LlmProviderError,
    };
    use crate::toolkit::creator_search::models::CreatorRecord;
    use async_trait::async_trait;

    struct CannedInterpreter(&'static str);

    #[async_trait]
    impl LlmProvider for CannedInterpreter {
        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> std::result::Result<(String, LlmMetadata), LlmProviderError> {
            Ok((self.0.to_string(), LlmMetadata::default()))
        }

        fn provider_name(&self) -> &str {
            "canned"
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn dataset() -> Arc<CreatorDataset> {
        Arc::new(CreatorDataset::from_records(vec![
            CreatorRecord::new("A", "Fashion", 20000, 5.0, 100.0, 20.0),
            CreatorRecord::new("B", "Fashion", 10000, 8.0, 50.0, 10.0),
            CreatorRecord::new("C", "Tech", 3000, 9.0, 10.0, 1.0),
            CreatorRecord::new("D", "Wellness", 4000, 2.0, 30.0, 3.0),
        ]))
    }

    fn pipeline(reply: Option<&'static str>) -> QueryPipeline {
        let provider = reply.map(|r| Arc::new(CannedInterpreter(r)) as Arc<dyn LlmProvider>);
        QueryPipeline::new(dataset(), HintParser::new(provider))
    }

    fn names(outcome: &QueryOutcome) -> Vec<&str> {
        outcome.ranked.iter().map(|r| r.record.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_substring_resolution_without_interpreter() {
        let outcome = pipeline(None)
            .run(&QueryRequest::new("Show me the top fashion creators"))
            .await;

        assert_eq!(outcome.category.as_deref(), Some("Fashion"));
        assert_eq!(names(&outcome), vec!["A", "B"]);
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::CategorySelected {
                category: "Fashion".to_string(),
                source: CategorySource::QueryText,
            }]
        );
    }

    #[tokio::test]
    async fn test_interpreter_hint_drives_filters() {
        let outcome = pipeline(Some(
            "{'category': 'fashion', 'follower_filter': '>15000', 'sort_by': 'engagement rate'}",
        ))
        .run(&QueryRequest::new("best creators for clothes").with_interpreter(true))
        .await;

        assert_eq!(outcome.category.as_deref(), Some("Fashion"));
        assert_eq!(outcome.follower_filter.map(|f| f.to_string()).as_deref(), Some(">15000"));
        assert_eq!(names(&outcome), vec!["A"]);
        assert_eq!(
            outcome.hint,
            Some(StructuredHint {
                category: Some("fashion".to_string()),
                follower_filter: Some(">15000".to_string()),
                sort_by: Some("engagement rate".to_string()),
            })
        );
        assert!(outcome.diagnostics.contains(&Diagnostic::SortHintIgnored {
            sort_by: "engagement rate".to_string()
        }));
    }

    #[tokio::test]
    async fn test_reply_without_object_falls_back_to_resolver() {
        let outcome = pipeline(Some("I think you want tech people."))
            .run(&QueryRequest::new("Find tech creators for my campaign").with_interpreter(true))
            .await;

        assert_eq!(outcome.category.as_deref(), Some("Tech"));
        assert_eq!(names(&outcome), vec!["C"]);
        assert_eq!(outcome.hint, None);
        assert!(matches!(
            outcome.diagnostics[0],
            Diagnostic::UnstructuredResponse { .. }
        ));
    }

    #[tokio::test]
    async fn test_unknown_hint_category_is_reported_and_ignored() {
        let outcome = pipeline(Some("{\"category\": \"gaming\"}"))
            .run(&QueryRequest::new("List wellness creators with high engagement").with_interpreter(true))
            .await;

        assert_eq!(outcome.category.as_deref(), Some("Wellness"));
        assert_eq!(
            outcome.diagnostics[0],
            Diagnostic::HintCategoryUnknown {
                category: "gaming".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unconfigured_interpreter_is_a_notice() {
        let outcome = pipeline(None)
            .run(&QueryRequest::new("tech").with_interpreter(true))
            .await;

        assert_eq!(outcome.diagnostics[0], Diagnostic::InterpreterUnavailable);
        assert_eq!(outcome.category.as_deref(), Some("Tech"));
    }

    #[tokio::test]
    async fn test_explicit_overrides_win() {
        let outcome = pipeline(Some("{\"category\": \"tech\", \"follower_filter\": \">1\"}"))
            .run(
                &QueryRequest::new("tech")
                    .with_interpreter(true)
                    .with_category("fashion")
                    .with_follower_filter("<15000"),
            )
            .await;

        assert_eq!(outcome.category.as_deref(), Some("Fashion"));
        assert_eq!(names(&outcome), vec!["B"]);
    }

    #[tokio::test]
    async fn test_show_all_disables_hint_filter() {
        let outcome = pipeline(Some("{\"category\": \"fashion\", \"follower_filter\": \">15000\"}"))
            .run(
                &QueryRequest::new("fashion")
                    .with_interpreter(true)
                    .with_follower_filter("Show all"),
            )
            .await;

        assert_eq!(outcome.follower_filter, None);
        assert_eq!(outcome.ranked.len(), 2);
    }

    #[tokio::test]
    async fn test_no_category_and_empty_results() {
        let p = pipeline(None);

        let none = p.run(&QueryRequest::new("who is popular?")).await;
        assert!(none.is_empty());
        assert_eq!(none.diagnostics, vec![Diagnostic::NoCategoryMatch]);

        let empty = p
            .run(&QueryRequest::new("tech").with_follower_filter(">100000"))
            .await;
        assert!(empty.is_empty());
        assert_eq!(empty.diagnostics.last(), Some(&Diagnostic::EmptyResultSet));
        assert_eq!(
            Diagnostic::EmptyResultSet.message(),
            "No creators found after applying filters."
        );
    }

    #[tokio::test]
    async fn test_unparsable_filter_is_ignored() {
        let outcome = pipeline(None)
            .run(&QueryRequest::new("fashion").with_follower_filter("lots"))
            .await;

        assert_eq!(outcome.ranked.len(), 2);
        assert!(outcome.diagnostics.contains(&Diagnostic::FollowerFilterIgnored {
            filter: "lots".to_string()
        }));
    }

    #[tokio::test]
    async fn test_session_preferences_flow_through() {
        let mut session = QuerySession::default();
        session.preferences_mut().weights = WeightVector::new(1.0, 0.0, 0.0).unwrap();

        let outcome = pipeline(None).run_in_session(&session, "fashion").await;
        assert_eq!(names(&outcome), vec!["B", "A"]);
        assert_eq!(outcome.top_table(1)[0].score, 8.0);
        assert_eq!(outcome.top_details(5).len(), 2);
        assert_eq!(outcome.to_csv().unwrap().lines().count(), 3);
    }

    #[test]
    fn test_diagnostics_serialize_tagged() {
        let json = serde_json::to_value(Diagnostic::MalformedHint {
            raw: "{x".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "malformed_hint");
        assert_eq!(json["raw"], "{x");
    }
}
