//! Facet aggregation (part of C8).
//!
//! Thin pass-through to `store::GraphStore::facets`, which already
//! dedupes by `chunk_hash` before counting (see `DESIGN.md`'s
//! resolution of the facet double-counting Open Question). The engine's
//! job here is limited to summing per-dimension totals for callers that
//! want a single number alongside the breakdown (spec §4.8 "totals
//! summed in the engine").

use crate::app::AppState;
use crate::error::Result;
use crate::store::model::SearchFacets;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FacetsResponse {
    #[serde(flatten)]
    pub facets: SearchFacets,
    pub total_languages: usize,
    pub total_intents: usize,
    pub total_sources: usize,
}

pub async fn facets(state: &AppState, query_text: &str, language: Option<&str>) -> Result<FacetsResponse> {
    let facets = state.store.facets(query_text, language).await?;
    Ok(FacetsResponse {
        total_languages: facets.languages.values().sum(),
        total_intents: facets.intents.values().sum(),
        total_sources: facets.sources.values().sum(),
        facets,
    })
}
