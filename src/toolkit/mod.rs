

pub mod creator_search;


pub use creator_search::{
    CreatorDataset, CreatorRecord, QueryOutcome, QueryPipeline, QueryRequest, QuerySession,
    ScoredRecord, WeightVector,
};
