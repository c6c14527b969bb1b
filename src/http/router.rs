//! axum route table binding the engine's operations to HTTP, using the
//! `State<Arc<AppState>>` extractor convention. CORS/trace layers and
//! graceful shutdown are wired up by the binary's `main`.

use crate::app::AppState;
use crate::error::EngineError;
use crate::pipeline::indexing::{index_document, IndexingRequest};
use crate::search::{self, SearchQuery};
use crate::store::ChunkRecord;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/index", post(index_handler))
        .route("/store_chunks", post(store_chunks_handler))
        .route("/search", post(search_handler))
        .route("/vector_search", post(vector_search_handler))
        .route("/walk", post(walk_handler))
        .route("/suggest", get(suggest_handler))
        .route("/facets", get(facets_handler))
        .route("/chunks/:hash", get(get_chunk_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match &self {
            EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            EngineError::Cancelled => StatusCode::from_u16(499).unwrap(),
            EngineError::Dependency { .. } => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct IndexRequest {
    pub source_name: String,
    /// Document text, taken directly rather than as base64 bytes — the
    /// underlying pipeline accepts raw bytes and dispatches on
    /// `source_name`'s extension either way.
    pub text: String,
    #[serde(default)]
    pub declared_language: Option<String>,
    #[serde(default)]
    pub intent_name: Option<String>,
}

async fn index_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IndexRequest>,
) -> Json<crate::store::model::IndexingResult> {
    let result = index_document(
        &state,
        IndexingRequest {
            filename: req.source_name,
            bytes: req.text.into_bytes(),
            declared_language: req.declared_language,
            intent_name: req.intent_name,
        },
    )
    .await;
    Json(result)
}

async fn store_chunks_handler(
    State(state): State<Arc<AppState>>,
    Json(records): Json<Vec<ChunkRecord>>,
) -> Result<Json<serde_json::Value>, EngineError> {
    let n = state.store_chunks(&records).await?;
    Ok(Json(serde_json::json!({ "chunks_stored": n })))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequestBody {
    pub query: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_true")]
    pub use_cache: bool,
}

fn default_k() -> usize {
    10
}

fn default_true() -> bool {
    true
}

#[derive(serde::Serialize)]
struct SearchResponseBody {
    results: Vec<crate::store::model::SearchResult>,
    cache_hit: bool,
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequestBody>,
) -> Result<Json<SearchResponseBody>, EngineError> {
    let query = SearchQuery {
        query_text: req.query,
        k: req.k,
        language: req.language,
        intent_filter: req.intent,
        phase_filter: req.phase,
        confidence_threshold: 0.0,
        use_cache: req.use_cache,
    };
    let outcome = search::search(&state, query, &CancellationToken::new()).await?;
    Ok(Json(SearchResponseBody {
        results: outcome.results,
        cache_hit: outcome.cache_hit,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VectorSearchRequestBody {
    pub query: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub min_score: f32,
}

async fn vector_search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VectorSearchRequestBody>,
) -> Result<Json<Vec<crate::store::model::SearchResult>>, EngineError> {
    let results = search::engine::vector_search(
        &state,
        &req.query,
        req.language.as_deref(),
        req.k,
        req.min_score,
    )
    .await?;
    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
pub struct WalkRequestBody {
    pub start_chunk_hash: String,
    pub max_depth: usize,
    #[serde(default)]
    pub intent_filter: Option<Vec<String>>,
    #[serde(default)]
    pub min_confidence: f32,
}

async fn walk_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WalkRequestBody>,
) -> Result<Json<Vec<crate::store::model::GraphPath>>, EngineError> {
    let paths = search::walk(
        &state,
        &req.start_chunk_hash,
        req.max_depth,
        req.intent_filter.as_deref(),
        req.min_confidence,
    )
    .await?;
    Ok(Json(paths))
}

async fn suggest_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<String>>, EngineError> {
    let prefix = params.get("prefix").cloned().unwrap_or_default();
    if prefix.trim().is_empty() {
        return Err(EngineError::invalid_input("prefix must not be empty"));
    }
    let language = params.get("language").map(|s| s.as_str());
    let limit = params
        .get("limit")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(10);
    let suggestions = search::suggest(&state, &prefix, language, limit).await?;
    Ok(Json(suggestions))
}

async fn facets_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<search::FacetsResponse>, EngineError> {
    let query_text = params.get("query").cloned().unwrap_or_default();
    let language = params.get("language").map(|s| s.as_str());
    let facets = search::facets(&state, &query_text, language).await?;
    Ok(Json(facets))
}

async fn get_chunk_handler(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<crate::store::model::Chunk>, EngineError> {
    state
        .store
        .get_chunk_by_hash(&hash)
        .await?
        .map(Json)
        .ok_or_else(|| EngineError::not_found(format!("no chunk with hash {hash}")))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "metrics": state.metrics.snapshot(),
        "vectorizer": state.vectorizer.stats(),
        "embedding_cache": state.embedding_cache.stats(),
    }))
}

async fn health_handler(
    State(state): State<Arc<AppState>>,
) -> Json<crate::telemetry::health::HealthReport> {
    Json(crate::telemetry::health::check(&state).await)
}
