use std::path::Path;

use endpoint_context::{ApiCorpus, Fingerprint, KeywordFilter};
use tracing::info;

use crate::config::Config;
use crate::error::AppError;

/// The corpus files as they were on disk at load time.
#[derive(Debug, Clone)]
pub struct CorpusSnapshot {
    pub corpus: ApiCorpus,
    pub rendered: Option<String>,
    pub fingerprint: Fingerprint,
}

impl CorpusSnapshot {
    pub fn load(config: &Config) -> Result<Self, AppError> {
        let corpus = load_corpus(&config.corpus_path)?;
        let rendered = config
            .rendered_path
            .as_deref()
            .map(read_file)
            .transpose()?;
        let fingerprint = Fingerprint::of(&corpus);
        let rendered_blocks = rendered
            .as_deref()
            .map_or(0, |text| KeywordFilter::default().count_blocks(text));

        info!(
            title = %corpus.title,
            endpoints = corpus.len(),
            rendered = rendered.is_some(),
            rendered_blocks,
            fingerprint = %fingerprint,
            "corpus loaded"
        );

        Ok(Self {
            corpus,
            rendered,
            fingerprint,
        })
    }
}

pub fn load_corpus(path: &Path) -> Result<ApiCorpus, AppError> {
    let json = read_file(path)?;
    ApiCorpus::from_json(&json).map_err(|e| AppError::Corpus {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_file(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|e| AppError::Corpus {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
