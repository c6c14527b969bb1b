//! Search suggestions (part of C8).
//!
//! Thin pass-through to `store::GraphStore::suggest`, which already
//! orders results shorter-then-lexicographic in Cypher (ported from
//! `get_search_suggestions`'s `ORDER BY length(suggestion) ASC`).

use crate::app::AppState;
use crate::error::Result;

pub async fn suggest(
    state: &AppState,
    query_text: &str,
    language: Option<&str>,
    limit: usize,
) -> Result<Vec<String>> {
    let limit = limit.clamp(1, 50);
    state.store.suggest(query_text, language, limit).await
}
