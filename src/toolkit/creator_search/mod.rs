

pub mod dataset;
pub mod export;
pub mod follower_filter;
pub mod models;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod resolver;
pub mod session;


pub use dataset::{CreatorDataset, DatasetSummary};
pub use export::{to_csv, write_csv};
pub use follower_filter::{normalize_follower_filter, parse_comparison};
pub use models::{ComparisonOp, CreatorRecord, FollowerFilter, Metric, ScoredRecord, WeightVector};
pub use pipeline::{CategorySource, Diagnostic, QueryOutcome, QueryPipeline, QueryRequest};
pub use ranking::{calculate_score, rank};
pub use report::{CondensedRow, CreatorDetail};
pub use resolver::resolve_category;
pub use session::{EXAMPLE_QUERIES, HistoryEntry, QuerySession, SessionPreferences};
