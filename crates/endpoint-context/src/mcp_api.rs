use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analyzer::AnalyzedQuery;
use crate::model::ScoredResult;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AnalyzeQueryParams {
    /// The developer's chat message about the loaded API.
    pub query: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchEndpointsParams {
    /// Free-text question about the API.
    pub query: String,
    /// Maximum number of endpoints to return (default: 8, max: 50).
    pub top_k: Option<u32>,
    /// Drop endpoints scoring below this (default: 0.1).
    pub min_score: Option<f64>,
    /// Restrict to one HTTP method ("GET", "POST", ... or "any"). Defaults to the method the query implies.
    pub method: Option<String>,
    /// Boost terms that name API resources such as "user" or "order" (default: true).
    pub boost_entity_terms: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FilterRenderedParams {
    /// Free-text question used to pick endpoint sections of the rendered description.
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeQueryResponse {
    pub original: String,
    pub normalized: String,
    pub intent: String,
    pub method_hint: String,
    pub keywords: Vec<String>,
    pub entity_terms: Vec<String>,
    pub status_code_hint: Option<u16>,
    pub endpoint_hint: Option<String>,
    pub is_global_query: bool,
    pub is_single_endpoint_query: bool,
}

impl From<&AnalyzedQuery> for AnalyzeQueryResponse {
    fn from(query: &AnalyzedQuery) -> Self {
        Self {
            original: query.original.clone(),
            normalized: query.normalized.clone(),
            intent: query.intent.to_string(),
            method_hint: query.method_hint.to_string(),
            keywords: query.keywords.clone(),
            entity_terms: query.entity_terms.iter().cloned().collect(),
            status_code_hint: query.status_code_hint,
            endpoint_hint: query.endpoint_hint.clone(),
            is_global_query: query.is_global_query,
            is_single_endpoint_query: query.is_single_endpoint_query,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EndpointMatch {
    pub id: String,
    pub name: String,
    pub method: String,
    pub path: String,
    pub score: f64,
    pub matched_terms: Vec<String>,
    pub matched_fields: Vec<String>,
}

impl From<&ScoredResult<'_>> for EndpointMatch {
    fn from(result: &ScoredResult<'_>) -> Self {
        Self {
            id: result.endpoint.id.clone(),
            name: result.endpoint.name.clone(),
            method: result.endpoint.method.to_string(),
            path: result.endpoint.path.clone(),
            score: result.score,
            matched_terms: result.matched_terms.clone(),
            matched_fields: result
                .matched_fields
                .iter()
                .map(|f| f.as_str().to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchEndpointsResponse {
    /// Fingerprint of the corpus snapshot the index was built from.
    pub fingerprint: String,
    pub intent: String,
    pub method_hint: String,
    pub is_single_endpoint_query: bool,
    pub results: Vec<EndpointMatch>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FilterRenderedResponse {
    pub text: String,
    pub total_blocks: usize,
    pub kept_blocks: usize,
    /// False when the text was returned unchanged.
    pub filtered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReloadCorpusResponse {
    pub fingerprint: String,
    pub endpoint_count: usize,
    pub rendered_loaded: bool,
    /// Whether a previously cached index was dropped.
    pub invalidated: bool,
}
