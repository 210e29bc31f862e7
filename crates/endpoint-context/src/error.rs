//! Error types for the context selection core.
//!
//! Analysis, indexing, ranking and filtering are total and never fail. These
//! errors only come from the conversions around them: parsing method tokens,
//! validating caller-supplied options and deserializing a corpus snapshot.

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    #[error("invalid search options: {0}")]
    InvalidOptions(String),

    #[error("corpus deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
