pub mod analyzer;
pub mod cache;
pub mod error;
pub mod filter;
pub mod index;
pub mod mcp_api;
pub mod model;
pub mod ranker;
pub mod strategy;
pub mod tokenize;

pub use analyzer::{analyze, AnalyzedQuery, Intent};
pub use cache::{EvictionPolicy, IndexCache};
pub use error::ContextError;
pub use filter::KeywordFilter;
pub use index::{build_index, Fingerprint, RelevanceIndex};
pub use model::{ApiCorpus, EndpointRecord, HttpMethod, MethodHint, ScoredResult};
pub use ranker::{search, SearchOptions};
pub use strategy::{ContextSelection, RelevanceStrategy};
