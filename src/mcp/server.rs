

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::core::config::InsightConfig;
use crate::core::error::InsightError;
use crate::llm::{HintParser, LlmProviderFactory};
use crate::toolkit::creator_search::session::HISTORY_DISPLAY_LIMIT;
use crate::toolkit::creator_search::{
    write_csv, CreatorDataset, QueryOutcome, QueryPipeline, QueryRequest, QuerySession,
    SessionPreferences, WeightVector, EXAMPLE_QUERIES,
};


const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const CONFIG_RESOURCE_URI: &str = "config://creator-insight";


#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct RankCreatorsParams {
    #[schemars(description = "Free-text request, e.g. 'top fashion creators with >10000 followers'")]
    pub query: String,
    #[schemars(description = "Explicit category; overrides detection from the query")]
    pub category: Option<String>,
    #[schemars(description = "Follower filter such as '>10000', '<5000', '=100' or 'show all'")]
    pub follower_filter: Option<String>,
    #[schemars(description = "Engagement rate weight in [0, 1] (default: session value)")]
    pub weight_engagement: Option<f64>,
    #[schemars(description = "Follower score weight in [0, 1] (default: session value)")]
    pub weight_followers: Option<f64>,
    #[schemars(description = "Likes+comments weight in [0, 1] (default: session value)")]
    pub weight_likes: Option<f64>,
    #[schemars(description = "Ask the query interpreter for a structured hint first")]
    pub use_interpreter: Option<bool>,
    #[schemars(description = "Number of creators with full detail (default: 5)")]
    pub detail_limit: Option<usize>,
    #[schemars(description = "Number of rows in the condensed table (default: 10)")]
    pub table_limit: Option<usize>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct ExportRankingParams {
    #[schemars(description = "Free-text request to rank")]
    pub query: String,
    #[schemars(description = "Explicit category; overrides detection from the query")]
    pub category: Option<String>,
    #[schemars(description = "Follower filter such as '>10000' or 'show all'")]
    pub follower_filter: Option<String>,
    #[schemars(description = "Output CSV path (default: configured export path)")]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct ReloadDatasetParams {
    #[schemars(description = "CSV path to load (default: configured data path)")]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct QueryHistoryParams {
    #[schemars(description = "Max entries, newest first (default: 5)")]
    pub limit: Option<usize>,
}


#[derive(Debug, Serialize)]
struct DiagnosticView {
    #[serde(flatten)]
    diagnostic: crate::toolkit::creator_search::Diagnostic,
    message: String,
    warning: bool,
}

fn diagnostic_views(outcome: &QueryOutcome) -> Vec<DiagnosticView> {
    outcome
        .diagnostics
        .iter()
        .map(|d| DiagnosticView {
            diagnostic: d.clone(),
            message: d.message(),
            warning: d.is_warning(),
        })
        .collect()
}


struct ServerState {
    config: InsightConfig,
    pipeline: Arc<QueryPipeline>,
    session: QuerySession,
}


#[derive(Clone)]
pub struct CreatorInsightMcpServer {
    state: Arc<RwLock<ServerState>>,
    tool_router: ToolRouter<Self>,
}

impl CreatorInsightMcpServer {

    pub fn new(config: InsightConfig, pipeline: QueryPipeline, preferences: SessionPreferences) -> Self {
        Self {
            state: Arc::new(RwLock::new(ServerState {
                config,
                pipeline: Arc::new(pipeline),
                session: QuerySession::new(preferences),
            })),
            tool_router: Self::tool_router(),
        }
    }


    fn convert_error(err: InsightError) -> McpError {
        match err {
            InsightError::Config(msg) | InsightError::Validation(msg) => {
                McpError::invalid_params(msg, None)
            }
            other => McpError::internal_error(other.to_string(), None),
        }
    }


    fn result_to_json<T: Serialize>(result: T) -> Result<String, McpError> {
        serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }

    /// Records the query in the session and resolves the request against the
    /// session preferences. The lock is released before ranking.
    async fn prepare(
        &self,
        query: &str,
        category: Option<String>,
        follower_filter: Option<String>,
    ) -> (Arc<QueryPipeline>, QueryRequest) {
        let mut state = self.state.write().await;
        state.session.record_query(query);

        let mut request = state.session.request(query);
        if category.is_some() {
            request.category = category;
        }
        if follower_filter.is_some() {
            request.follower_filter = follower_filter;
        }
        (state.pipeline.clone(), request)
    }
}

#[tool_router]
impl CreatorInsightMcpServer {

    #[tool(description = "Rank creators for a free-text request. Category comes from the explicit argument, the query interpreter, or the query text. Returns: {query_id, category, follower_filter, hint, total, diagnostics, top_details, top_table}")]
    async fn rank_creators(
        &self,
        Parameters(params): Parameters<RankCreatorsParams>,
    ) -> Result<CallToolResult, McpError> {
        let query_preview = crate::safe_truncate_ellipsis(&params.query, 50);
        info!("🔍 Ranking creators: '{}'", query_preview);

        let (pipeline, mut request) = self
            .prepare(&params.query, params.category, params.follower_filter)
            .await;

        let current = request.weights;
        request.weights = WeightVector::new(
            params.weight_engagement.unwrap_or(current.engagement()),
            params.weight_followers.unwrap_or(current.follower()),
            params.weight_likes.unwrap_or(current.likes()),
        )
        .map_err(Self::convert_error)?;
        if let Some(enabled) = params.use_interpreter {
            request.use_interpreter = enabled;
        }

        let (detail_limit, table_limit) = {
            let state = self.state.read().await;
            (
                params.detail_limit.unwrap_or(state.config.detail_limit),
                params.table_limit.unwrap_or(state.config.table_limit),
            )
        };

        let outcome = pipeline.run(&request).await;
        if outcome.is_empty() {
            warn!("⚠️ No creators matched '{}'", query_preview);
        } else {
            info!("✅ Ranked {} creators", outcome.ranked.len());
        }

        let json = Self::result_to_json(json!({
            "query_id": outcome.query_id,
            "query": outcome.query,
            "category": outcome.category,
            "follower_filter": outcome.follower_filter.map(|f| f.to_string()),
            "hint": outcome.hint,
            "total": outcome.ranked.len(),
            "diagnostics": diagnostic_views(&outcome),
            "top_details": outcome.top_details(detail_limit),
            "top_table": outcome.top_table(table_limit),
        }))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }


    #[tool(description = "List the creator categories present in the dataset, in first-appearance order, plus example queries. Returns: {categories, example_queries}")]
    async fn list_categories(&self) -> Result<CallToolResult, McpError> {
        let state = self.state.read().await;
        let json = Self::result_to_json(json!({
            "categories": state.pipeline.dataset().categories(),
            "example_queries": EXAMPLE_QUERIES,
        }))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }


    #[tool(description = "Summarize the loaded dataset. Returns: {records, categories, min_followers, max_followers}")]
    async fn dataset_summary(&self) -> Result<CallToolResult, McpError> {
        info!("📊 Dataset summary requested");

        let state = self.state.read().await;
        let json = Self::result_to_json(state.pipeline.dataset().summary())?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }


    #[tool(description = "Rank creators and write the full ranked set as CSV (header first, with Follower_Score, avg_likes_comments and Score columns). Returns: {path, rows, diagnostics}")]
    async fn export_ranking(
        &self,
        Parameters(params): Parameters<ExportRankingParams>,
    ) -> Result<CallToolResult, McpError> {
        let (pipeline, request) = self
            .prepare(&params.query, params.category, params.follower_filter)
            .await;
        let path = match params.path {
            Some(path) => path,
            None => self.state.read().await.config.export_path.clone(),
        };

        let outcome = pipeline.run(&request).await;
        write_csv(&outcome.ranked, &path).map_err(Self::convert_error)?;
        info!("💾 Exported {} creators to {}", outcome.ranked.len(), path);

        let json = Self::result_to_json(json!({
            "path": path,
            "rows": outcome.ranked.len(),
            "diagnostics": diagnostic_views(&outcome),
        }))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }


    #[tool(description = "Reload the creator CSV from disk and swap it in for subsequent queries. Returns: {path, records, categories}")]
    async fn reload_dataset(
        &self,
        Parameters(params): Parameters<ReloadDatasetParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut state = self.state.write().await;
        let path = PathBuf::from(params.path.unwrap_or_else(|| state.config.data_path.clone()));
        info!("🔄 Reloading dataset from {}", path.display());

        let dataset = CreatorDataset::from_path(&path).map_err(Self::convert_error)?;
        let summary = dataset.summary();
        state.pipeline = Arc::new(state.pipeline.with_dataset(Arc::new(dataset)));

        let json = Self::result_to_json(json!({
            "path": path.display().to_string(),
            "records": summary.records,
            "categories": summary.categories,
        }))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }


    #[tool(description = "Recent distinct queries from this session, newest first. Returns: [{query, asked_at}]")]
    async fn query_history(
        &self,
        Parameters(params): Parameters<QueryHistoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let state = self.state.read().await;
        let recent = state
            .session
            .recent(params.limit.unwrap_or(HISTORY_DISPLAY_LIMIT));
        let json = Self::result_to_json(&recent)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for CreatorInsightMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "creator-insight".into(),
                version: SERVER_VERSION.into(),
                ..Default::default()
            },
            instructions: Some(
                "Creator ranking over a tabular engagement dataset. Use rank_creators with a \
                 free-text request (optionally an explicit category and follower filter), \
                 list_categories to see what can be ranked, and export_ranking to write CSV."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: vec![
                RawResource::new(CONFIG_RESOURCE_URI, "creator-insight-config".to_string())
                    .no_annotation(),
            ],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        match uri.as_str() {
            CONFIG_RESOURCE_URI => {
                let state = self.state.read().await;
                let config = &state.config;
                let preferences = state.session.preferences();
                let content = serde_json::to_string_pretty(&json!({
                    "version": SERVER_VERSION,
                    "dataset": {
                        "path": config.data_path,
                        "records": state.pipeline.dataset().len(),
                    },
                    "export_path": config.export_path,
                    "interpreter": {
                        "enabled": preferences.use_interpreter,
                        "available": state.pipeline.hint_parser().is_available(),
                        "provider": config.llm_provider,
                        "model": config.llm_model,
                        "fallback_enabled": config.llm_fallback_enabled,
                    },
                    "weights": preferences.weights,
                    "limits": {
                        "detail": config.detail_limit,
                        "table": config.table_limit,
                    },
                    "tools": [
                        "rank_creators",
                        "list_categories",
                        "dataset_summary",
                        "export_ranking",
                        "reload_dataset",
                        "query_history",
                    ],
                }))
                .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(content, uri)],
                })
            }
            _ => Err(McpError::resource_not_found(
                format!("Unknown resource: {}", uri),
                Some(json!({ "uri": uri })),
            )),
        }
    }
}


pub async fn run_server() -> anyhow::Result<()> {
    info!("🚀 Initializing Creator Insight MCP Server...");

    let config = InsightConfig::from_env();
    config.validate()?;

    let dataset = CreatorDataset::from_path(&config.data_path)?;
    let provider = LlmProviderFactory::from_config(&config)?;
    let hint_parser = HintParser::from_config(provider, &config);
    let preferences = SessionPreferences::from_config(&config)?;

    info!("✅ Creator Insight MCP Server ready");
    info!("   📍 Dataset: {} ({} creators)", config.data_path, dataset.len());
    info!(
        "   🤖 Interpreter: {}/{} (enabled={}, available={})",
        config.llm_provider,
        config.llm_model,
        config.llm_enabled,
        hint_parser.is_available()
    );

    let pipeline = QueryPipeline::new(Arc::new(dataset), hint_parser);
    let server = CreatorInsightMcpServer::new(config, pipeline, preferences);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
