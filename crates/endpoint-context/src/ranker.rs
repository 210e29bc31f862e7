//! BM25 ranking over a built relevance index with intent-aware boosts.
//!
//! Each matched query term contributes its BM25 score, multiplied by every
//! boost that applies (entity term, method match, path hint, auth intent,
//! status code). Boosts compound.
use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};

use crate::analyzer::{AnalyzedQuery, Intent};
use crate::error::ContextError;
use crate::index::RelevanceIndex;
use crate::model::{EndpointRecord, MethodHint, ScoredResult};
use crate::tokenize::tokenize;

const ENTITY_BOOST: f64 = 1.8;
const METHOD_BOOST: f64 = 1.5;
const PATH_HINT_BOOST: f64 = 3.0;
const AUTH_BOOST: f64 = 2.0;
const STATUS_CODE_BOOST: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub top_k: usize,
    pub min_score: f64,
    /// `None` uses the query's own method hint.
    pub method_filter: Option<MethodHint>,
    pub boost_entity_terms: bool,
    pub bm25: Bm25Params,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 8,
            min_score: 0.1,
            method_filter: None,
            boost_entity_terms: true,
            bm25: Bm25Params::default(),
        }
    }
}

impl SearchOptions {
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.top_k == 0 {
            return Err(ContextError::InvalidOptions("top_k must be at least 1".to_string()));
        }
        if self.min_score.is_nan() || self.min_score < 0.0 {
            return Err(ContextError::InvalidOptions(format!(
                "min_score must be a non-negative number, got {}",
                self.min_score
            )));
        }
        if !(self.bm25.k1 >= 0.0) || !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(ContextError::InvalidOptions(format!(
                "bm25 parameters out of range: k1={}, b={}",
                self.bm25.k1, self.bm25.b
            )));
        }
        Ok(())
    }
}

/// Rank `endpoints` against `query`.
///
/// `endpoints` must be the corpus the index was built from, in the same
/// order. Results are sorted by descending score; equal scores keep corpus
/// order, so the output is deterministic for a fixed query and corpus.
pub fn search<'a>(
    index: &RelevanceIndex,
    endpoints: &'a [EndpointRecord],
    query: &AnalyzedQuery,
    options: &SearchOptions,
) -> Vec<ScoredResult<'a>> {
    let terms = query_terms(query);
    if terms.is_empty() || index.doc_count() == 0 {
        return Vec::new();
    }

    if index.doc_count() != endpoints.len() {
        warn!(
            fingerprint = %index.fingerprint(),
            indexed = index.doc_count(),
            endpoints = endpoints.len(),
            "endpoint slice does not match index, scoring common prefix only"
        );
    }

    let entity_terms: HashSet<String> = query
        .entity_terms
        .iter()
        .flat_map(|entity| tokenize(entity))
        .collect();
    let method_filter = options.method_filter.unwrap_or(query.method_hint);
    let path_hint = query.endpoint_hint.as_deref().map(str::to_lowercase);
    let Bm25Params { k1, b } = options.bm25;
    let avg_doc_len = index.avg_doc_len();

    let mut candidates: Vec<ScoredResult<'a>> = Vec::new();
    for (doc, endpoint) in index.documents().iter().zip(endpoints) {
        let mut doc_boost = 1.0;
        if !method_filter.is_any() && method_filter.matches(endpoint.method) {
            doc_boost *= METHOD_BOOST;
        }
        if let Some(hint) = &path_hint {
            if endpoint.path.to_lowercase().contains(hint.as_str()) {
                doc_boost *= PATH_HINT_BOOST;
            }
        }
        if query.intent == Intent::UnderstandAuth && endpoint.auth_required {
            doc_boost *= AUTH_BOOST;
        }
        if query.intent == Intent::DebugError {
            if let Some(status) = query.status_code_hint {
                if endpoint.has_response_status(status) {
                    doc_boost *= STATUS_CODE_BOOST;
                }
            }
        }

        let length_norm = 1.0 - b + b * (doc.length / avg_doc_len);
        let mut score = 0.0;
        let mut matched_terms = Vec::new();
        let mut matched_fields = BTreeSet::new();
        for term in &terms {
            let tf = doc.term_freq(term);
            if tf <= 0.0 {
                continue;
            }
            let mut term_score = index.idf(term) * tf * (k1 + 1.0) / (tf + k1 * length_norm);
            if options.boost_entity_terms && entity_terms.contains(term) {
                term_score *= ENTITY_BOOST;
            }
            score += term_score * doc_boost;
            matched_terms.push(term.clone());
            if let Some(fields) = doc.term_fields.get(term) {
                matched_fields.extend(fields.iter().copied());
            }
        }

        if score > 0.0 {
            candidates.push(ScoredResult {
                endpoint,
                score,
                matched_terms,
                matched_fields: matched_fields.into_iter().collect(),
            });
        }
    }

    let scored = candidates.len();
    let filter_keeps_some = candidates
        .iter()
        .any(|c| method_filter.matches(c.endpoint.method));
    if !method_filter.is_any() && filter_keeps_some {
        candidates.retain(|c| method_filter.matches(c.endpoint.method));
    }

    candidates.sort_by(|left, right| right.score.total_cmp(&left.score));
    candidates.retain(|c| c.score >= options.min_score);
    candidates.truncate(options.top_k);

    debug!(
        fingerprint = %index.fingerprint(),
        terms = terms.len(),
        scored,
        returned = candidates.len(),
        method_filter = %method_filter,
        "bm25 search complete"
    );

    candidates
}

/// Keywords then entity terms, run through the index tokenizer, deduplicated
/// in first-seen order.
fn query_terms(query: &AnalyzedQuery) -> Vec<String> {
    let mut seen = HashSet::new();
    query
        .keywords
        .iter()
        .chain(query.entity_terms.iter())
        .flat_map(|term| tokenize(term))
        .filter(|term| seen.insert(term.clone()))
        .collect()
}
