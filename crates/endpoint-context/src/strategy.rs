//! One entry point over the two relevance strategies.
//!
//! Structured corpora go through the analyzer, the cached BM25 index and the
//! ranker. Flat rendered text goes through the keyword filter. The context
//! assembler downstream can read a `ContextSelection` without knowing which
//! path produced it.
use crate::analyzer::{analyze, AnalyzedQuery};
use crate::cache::IndexCache;
use crate::filter::{FilterMode, KeywordFilter};
use crate::index::Fingerprint;
use crate::model::{ApiCorpus, ScoredResult};
use crate::ranker::{search, SearchOptions};

#[derive(Debug)]
pub enum RelevanceStrategy<'a> {
    Structured {
        corpus: &'a ApiCorpus,
        cache: &'a IndexCache,
        options: SearchOptions,
    },
    RenderedText {
        rendered: &'a str,
        filter: KeywordFilter,
    },
}

#[derive(Debug, Clone)]
pub enum ContextSelection<'a> {
    Ranked {
        analysis: AnalyzedQuery,
        fingerprint: Fingerprint,
        results: Vec<ScoredResult<'a>>,
    },
    Filtered {
        text: String,
        mode: FilterMode,
        total_blocks: usize,
        kept_blocks: usize,
    },
}

impl<'a> RelevanceStrategy<'a> {
    pub fn structured(corpus: &'a ApiCorpus, cache: &'a IndexCache) -> Self {
        Self::Structured {
            corpus,
            cache,
            options: SearchOptions::default(),
        }
    }

    pub fn rendered(rendered: &'a str) -> Self {
        Self::RenderedText {
            rendered,
            filter: KeywordFilter::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Structured { .. } => "bm25",
            Self::RenderedText { .. } => "keyword_filter",
        }
    }

    pub fn select(&self, query: &str) -> ContextSelection<'a> {
        match self {
            Self::Structured {
                corpus,
                cache,
                options,
            } => {
                let corpus: &'a ApiCorpus = *corpus;
                let analysis = analyze(query);
                let index = cache.get_or_build(corpus);
                let results = search(&index, &corpus.endpoints, &analysis, options);
                ContextSelection::Ranked {
                    analysis,
                    fingerprint: index.fingerprint().clone(),
                    results,
                }
            }
            Self::RenderedText { rendered, filter } => {
                let outcome = filter.apply(rendered, query);
                ContextSelection::Filtered {
                    text: outcome.text,
                    mode: outcome.mode,
                    total_blocks: outcome.total_blocks,
                    kept_blocks: outcome.kept_blocks,
                }
            }
        }
    }
}

impl ContextSelection<'_> {
    pub fn strategy_name(&self) -> &'static str {
        match self {
            Self::Ranked { .. } => "bm25",
            Self::Filtered { .. } => "keyword_filter",
        }
    }

    /// Ranked results, or endpoint blocks kept in the filtered text.
    pub fn len(&self) -> usize {
        match self {
            Self::Ranked { results, .. } => results.len(),
            Self::Filtered { kept_blocks, .. } => *kept_blocks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
