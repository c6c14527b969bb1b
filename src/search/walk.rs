//! Graph walk (part of C8).
//!
//! Delegates to `store::GraphStore::walk`, which already bounds
//! expansion and tracks visited nodes per-path (spec §9 "the walk
//! algorithm MUST track visited nodes within a path ... and MUST bound
//! total expansion"). This layer only validates `max_depth` and applies
//! the request-level confidence floor (spec §4.8 "paths with confidence
//! below the request threshold are filtered out").

use crate::app::AppState;
use crate::error::{EngineError, Result};
use crate::store::graph_store::MAX_WALK_DEPTH;
use crate::store::model::GraphPath;

const DEFAULT_WALK_LIMIT: usize = 50;

pub async fn walk(
    state: &AppState,
    start_chunk_hash: &str,
    max_depth: usize,
    intent_filter: Option<&[String]>,
    min_confidence: f32,
) -> Result<Vec<GraphPath>> {
    if max_depth == 0 || max_depth > MAX_WALK_DEPTH {
        return Err(EngineError::invalid_input(format!(
            "max_depth must be in 1..={MAX_WALK_DEPTH}, got {max_depth}"
        )));
    }

    let paths = state
        .store
        .walk(start_chunk_hash, max_depth, intent_filter, DEFAULT_WALK_LIMIT)
        .await?;

    Ok(paths
        .into_iter()
        .filter(|p| p.confidence >= min_confidence)
        .collect())
}
