use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("corpus error in {}: {message}", path.display())]
    Corpus { path: PathBuf, message: String },

    #[error(transparent)]
    Common(#[from] endpoint_context::ContextError),
}
