//! MCP server over the context selection core.
//!
//! Exposes four tools:
//! - `analyze_query`: Intent, method hint and search terms for a chat message
//! - `search_endpoints`: BM25 ranking over the structured corpus
//! - `filter_rendered_context`: Keyword filter over the rendered corpus
//! - `reload_corpus`: Re-read the corpus files and drop the stale index
use std::sync::Arc;

use endpoint_context::filter::FilterMode;
use endpoint_context::mcp_api::{
    AnalyzeQueryParams, AnalyzeQueryResponse, EndpointMatch, FilterRenderedParams,
    FilterRenderedResponse, ReloadCorpusResponse, SearchEndpointsParams, SearchEndpointsResponse,
};
use endpoint_context::{analyze, search, IndexCache, KeywordFilter, MethodHint, SearchOptions};
use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::Config;
use crate::corpus::CorpusSnapshot;

const MAX_TOP_K: usize = 50;

/// Shared application state. Tools read concurrently; `reload_corpus`
/// swaps the snapshot under the write lock.
pub struct AppState {
    pub snapshot: CorpusSnapshot,
}

#[derive(Clone)]
pub struct EndpointContextServer {
    state: Arc<RwLock<AppState>>,
    cache: Arc<IndexCache>,
    config: Arc<Config>,
    tool_router: ToolRouter<EndpointContextServer>,
}

impl EndpointContextServer {
    pub fn new(snapshot: CorpusSnapshot, config: Config) -> Self {
        let cache = Arc::new(IndexCache::new(config.cache_capacity));
        info!(
            capacity = cache.capacity(),
            policy = ?cache.policy(),
            "index cache ready"
        );
        // Build eagerly so the first search does not pay for it.
        if !snapshot.corpus.is_empty() {
            cache.get_or_build(&snapshot.corpus);
        }

        Self {
            state: Arc::new(RwLock::new(AppState { snapshot })),
            cache,
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }
}

fn require_query(query: &str) -> Result<&str, String> {
    let query = query.trim();
    if query.is_empty() {
        return Err("query must not be empty".to_string());
    }
    Ok(query)
}

#[tool_router]
impl EndpointContextServer {
    #[tool(description = "Analyze a developer's question about the loaded API. Returns the detected intent, implied HTTP method, status code, endpoint path, keywords and resource terms.")]
    async fn analyze_query(
        &self,
        Parameters(params): Parameters<AnalyzeQueryParams>,
    ) -> Result<Json<AnalyzeQueryResponse>, String> {
        let query = require_query(&params.query)?;
        Ok(Json(AnalyzeQueryResponse::from(&analyze(query))))
    }

    #[tool(description = "Rank the loaded API's endpoints by relevance to a question using BM25 with intent-aware boosts. Returns the best matching endpoints with scores and the terms that matched.")]
    async fn search_endpoints(
        &self,
        Parameters(params): Parameters<SearchEndpointsParams>,
    ) -> Result<Json<SearchEndpointsResponse>, String> {
        let query = require_query(&params.query)?;

        let method_filter = params
            .method
            .as_deref()
            .map(str::parse::<MethodHint>)
            .transpose()
            .map_err(|e| e.to_string())?;

        let defaults = SearchOptions::default();
        let options = SearchOptions {
            top_k: params
                .top_k
                .map(|k| k as usize)
                .unwrap_or(self.config.default_top_k)
                .min(MAX_TOP_K),
            min_score: params.min_score.unwrap_or(defaults.min_score),
            method_filter,
            boost_entity_terms: params
                .boost_entity_terms
                .unwrap_or(defaults.boost_entity_terms),
            ..defaults
        };
        options.validate().map_err(|e| e.to_string())?;

        let state = self.state.read().await;
        let corpus = &state.snapshot.corpus;
        if corpus.is_empty() {
            return Err("no structured corpus loaded".to_string());
        }

        let analysis = analyze(query);
        let index = self.cache.get_or_build(corpus);
        let results: Vec<EndpointMatch> = search(&index, &corpus.endpoints, &analysis, &options)
            .iter()
            .map(EndpointMatch::from)
            .collect();

        debug!(
            intent = %analysis.intent,
            results = results.len(),
            "search_endpoints served"
        );

        Ok(Json(SearchEndpointsResponse {
            fingerprint: index.fingerprint().to_string(),
            intent: analysis.intent.to_string(),
            method_hint: analysis.method_hint.to_string(),
            is_single_endpoint_query: analysis.is_single_endpoint_query,
            results,
        }))
    }

    #[tool(description = "Trim the rendered API description to the endpoint sections relevant to a question. Small descriptions are returned unchanged; otherwise at most 30 endpoint sections are kept.")]
    async fn filter_rendered_context(
        &self,
        Parameters(params): Parameters<FilterRenderedParams>,
    ) -> Result<Json<FilterRenderedResponse>, String> {
        let query = require_query(&params.query)?;

        let state = self.state.read().await;
        let rendered = state
            .snapshot
            .rendered
            .as_deref()
            .ok_or_else(|| "no rendered corpus loaded".to_string())?;

        let outcome = KeywordFilter::default().apply(rendered, query);
        Ok(Json(FilterRenderedResponse {
            filtered: outcome.mode != FilterMode::PassThrough,
            text: outcome.text,
            total_blocks: outcome.total_blocks,
            kept_blocks: outcome.kept_blocks,
        }))
    }

    #[tool(description = "Re-read the corpus files from disk and drop the cached index of the previous snapshot.")]
    async fn reload_corpus(&self) -> Result<Json<ReloadCorpusResponse>, String> {
        info!("reload_corpus tool invoked");

        let snapshot =
            CorpusSnapshot::load(&self.config).map_err(|e| format!("reload failed: {e}"))?;

        let mut state = self.state.write().await;
        // Fingerprints can collide across edits, so the old entry always goes.
        let invalidated = self.cache.invalidate(&state.snapshot.fingerprint);
        state.snapshot = snapshot;

        let response = ReloadCorpusResponse {
            fingerprint: state.snapshot.fingerprint.to_string(),
            endpoint_count: state.snapshot.corpus.len(),
            rendered_loaded: state.snapshot.rendered.is_some(),
            invalidated,
        };
        info!(
            fingerprint = %response.fingerprint,
            endpoints = response.endpoint_count,
            invalidated,
            "corpus reloaded"
        );

        Ok(Json(response))
    }
}

#[tool_handler]
impl ServerHandler for EndpointContextServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "endpoint-context".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "API endpoint context selection. Use analyze_query to see how a question \
                 is interpreted, search_endpoints to rank the loaded API's endpoints for \
                 a question, filter_rendered_context to trim the rendered API description, \
                 and reload_corpus after the corpus files change."
                    .to_string(),
            ),
        }
    }
}
