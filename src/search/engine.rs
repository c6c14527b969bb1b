//! Hybrid Search Engine (C7).
//!
//! Embeds the query, races a vector-kNN arm against a keyword/graph arm
//! with `tokio::join!` and a per-arm timeout, merges by `chunk_hash`,
//! re-ranks, and caches the final page.

use crate::app::AppState;
use crate::error::{EngineError, Result};
use crate::search::rerank;
use crate::store::model::{ResultType, SearchResult};
use md5::{Digest, Md5};
use regex::Regex;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const VECTOR_ARM_TIMEOUT: Duration = Duration::from_secs(5);
const GRAPH_ARM_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_KEYWORDS: usize = 5;

fn keyword_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\w{3,}\b").expect("valid regex"))
}

fn stop_words() -> &'static HashSet<&'static str> {
    static WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    WORDS.get_or_init(|| {
        [
            "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with",
            "by", "це", "в", "на", "з", "до", "від", "для", "як", "що", "і", "та", "або",
        ]
        .into_iter()
        .collect()
    })
}

/// Keywords for the graph arm's fulltext query: lowercased words of at
/// least 3 characters, stop words dropped, capped at `MAX_KEYWORDS`.
fn extract_keywords(query_text: &str) -> Vec<String> {
    let lowered = query_text.to_lowercase();
    keyword_word_re()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .filter(|w| !stop_words().contains(w.as_str()))
        .take(MAX_KEYWORDS)
        .collect()
}

/// Parameters for one hybrid search call.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query_text: String,
    pub k: usize,
    pub language: Option<String>,
    pub intent_filter: Option<String>,
    /// Spec §6 `phase?` — filters the final result list by
    /// `SearchResult.phase_name` when set.
    pub phase_filter: Option<String>,
    pub confidence_threshold: f32,
    /// Spec §6 `use_cache=true` — set `false` to bypass both the cache
    /// probe and the cache write-back for this call.
    pub use_cache: bool,
}

impl Default for SearchQuery {
    fn default() -> Self {
        SearchQuery {
            query_text: String::new(),
            k: 10,
            language: None,
            intent_filter: None,
            phase_filter: None,
            confidence_threshold: 0.0,
            use_cache: true,
        }
    }
}

impl SearchQuery {
    fn cache_key(&self) -> String {
        let mut hasher = Md5::new();
        hasher.update(self.query_text.as_bytes());
        hasher.update(self.k.to_le_bytes());
        hasher.update(self.language.as_deref().unwrap_or("").as_bytes());
        hasher.update(self.intent_filter.as_deref().unwrap_or("").as_bytes());
        hasher.update(self.confidence_threshold.to_le_bytes());
        format!("search:{:x}", hasher.finalize())
    }
}

/// Outcome of a hybrid search call: the ranked results plus whether they
/// came from the result cache (spec §4.7 step 1 "return with
/// cache_hit=true").
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub cache_hit: bool,
}

/// Run a hybrid vector+graph search, honoring `cancel` for cooperative
/// cancellation (spec §4.7/§5's two-arm race-and-cancel requirement).
pub async fn search(
    state: &AppState,
    query: SearchQuery,
    cancel: &CancellationToken,
) -> Result<SearchOutcome> {
    if query.query_text.trim().is_empty() {
        return Err(EngineError::invalid_input("query must not be empty"));
    }
    let k = crate::app::invalid_k(query.k)?;
    let cache_key = query.cache_key();

    if query.use_cache {
        if let Some(cached) = state.search_cache.get(&cache_key).await {
            if let Ok(results) = serde_json::from_slice::<Vec<SearchResult>>(&cached) {
                state.metrics.record_cache_hit();
                return Ok(SearchOutcome { results, cache_hit: true });
            }
        }
    }
    state.metrics.record_cache_miss();

    let stopwatch = crate::telemetry::metrics::Stopwatch::start();
    let mut results = tokio::select! {
        _ = cancel.cancelled() => return Err(EngineError::Cancelled),
        result = run_arms(state, &query, k) => result?,
    };
    state.metrics.record_search(ResultType::Hybrid, stopwatch.elapsed());

    if let Some(phase) = &query.phase_filter {
        results.retain(|r| r.phase_name.as_deref() == Some(phase.as_str()));
    }

    if query.use_cache {
        if let Ok(encoded) = serde_json::to_vec(&results) {
            state.search_cache.insert(cache_key, encoded).await;
        }
    }

    Ok(SearchOutcome { results, cache_hit: false })
}

/// Vector-only search (spec §6 `vector_search`): embed the query and run
/// `vector_knn` alone, with no graph arm and no result cache. Used where
/// callers want a pure-similarity result set rather than the fused
/// hybrid ranking.
pub async fn vector_search(
    state: &AppState,
    query_text: &str,
    language: Option<&str>,
    k: usize,
    min_score: f32,
) -> Result<Vec<SearchResult>> {
    if query_text.trim().is_empty() {
        return Err(EngineError::invalid_input("query must not be empty"));
    }
    let k = crate::app::invalid_k(k)?;

    let embedding = embed_query(state, query_text).await?;
    let mut hits = state.store.vector_knn(&embedding, k, language, min_score).await?;
    for hit in hits.iter_mut() {
        hit.result_type = ResultType::Vector;
        hit.combined_score = hit.vector_score;
    }
    hits.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk_hash.cmp(&b.chunk_hash))
    });
    hits.truncate(k);
    Ok(hits)
}

async fn run_arms(state: &AppState, query: &SearchQuery, k: usize) -> Result<Vec<SearchResult>> {
    let embedding = embed_query(state, &query.query_text).await?;
    let keywords = extract_keywords(&query.query_text);

    let over_fetch = k * 2;
    let (vector_res, graph_res) = tokio::join!(
        tokio::time::timeout(
            VECTOR_ARM_TIMEOUT,
            state.store.vector_knn(
                &embedding,
                over_fetch,
                query.language.as_deref(),
                query.confidence_threshold,
            ),
        ),
        tokio::time::timeout(
            GRAPH_ARM_TIMEOUT,
            state.store.graph_search(
                &keywords,
                query.language.as_deref(),
                query.intent_filter.as_deref(),
                over_fetch,
            ),
        ),
    );

    let vector_hits = unwrap_arm(vector_res, "vector")?;
    let graph_hits = unwrap_arm(graph_res, "graph")?;

    let merged = merge_arms(vector_hits, graph_hits, query);
    let weights = state.config.ranking_weights.clone();

    let mut scored: Vec<SearchResult> = merged
        .into_iter()
        .map(|mut r| {
            r.combined_score = rerank::combined_score(&r, &weights);
            rerank::apply_substring_boost(&mut r, &query.query_text);
            r
        })
        .collect();

    scored = rerank::rank_and_filter(scored);
    scored.truncate(k);
    Ok(scored)
}

fn unwrap_arm(
    outcome: std::result::Result<Result<Vec<SearchResult>>, tokio::time::error::Elapsed>,
    arm: &str,
) -> Result<Vec<SearchResult>> {
    match outcome {
        Ok(Ok(hits)) => Ok(hits),
        Ok(Err(e)) => {
            warn!(%arm, error = %e, "search arm failed");
            Ok(vec![])
        }
        Err(_) => {
            warn!(%arm, "search arm timed out");
            Ok(vec![])
        }
    }
}

async fn embed_query(state: &AppState, text: &str) -> Result<Vec<f32>> {
    let mut vectors = state.embed_texts(std::slice::from_ref(&text.to_string())).await?;
    Ok(vectors.pop().unwrap_or_default())
}

/// Merge two arms' hits by `chunk_hash`: a hash present in both becomes
/// one `Hybrid` result carrying both score components; a hash present in
/// only one arm keeps that arm's `result_type`.
fn merge_arms(
    vector_hits: Vec<SearchResult>,
    graph_hits: Vec<SearchResult>,
    query: &SearchQuery,
) -> Vec<SearchResult> {
    let mut merged: HashMap<String, SearchResult> = HashMap::new();

    for mut hit in vector_hits {
        hit.result_type = ResultType::Vector;
        score_intent_and_language(&mut hit, query);
        merged.insert(hit.chunk_hash.clone(), hit);
    }

    for mut hit in graph_hits {
        score_intent_and_language(&mut hit, query);
        match merged.get_mut(&hit.chunk_hash) {
            Some(existing) => {
                existing.graph_score = hit.graph_score;
                existing.graph_distance = hit.graph_distance;
                existing.result_type = ResultType::Hybrid;
                if existing.intent_name.is_none() {
                    existing.intent_name = hit.intent_name.clone();
                }
                existing.related_intents = hit.related_intents.clone();
            }
            None => {
                hit.result_type = ResultType::Graph;
                merged.insert(hit.chunk_hash.clone(), hit);
            }
        }
    }

    merged.into_values().collect()
}

/// `intent_score` is 1.0 on exact match to the intent filter, 0.5 if the
/// result carries any intent at all, 0 otherwise (spec §4.7 step 4).
/// `language_score` is a fixed 0.8 whenever a language was requested —
/// match or not — matching the spec's literal placeholder ("the scoring
/// leaves room for a future detector-based value but MUST still produce
/// a deterministic number in [0,1]"), and 0.8 when no language was
/// requested at all.
fn score_intent_and_language(result: &mut SearchResult, query: &SearchQuery) {
    result.intent_score = match &query.intent_filter {
        Some(wanted) if result.intent_name.as_deref() == Some(wanted.as_str()) => 1.0,
        _ if result.intent_name.is_some() => 0.5,
        _ => 0.0,
    };
    result.language_score = 0.8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_short_words_and_stop_words() {
        let keywords = extract_keywords("the quick AI and a fox");
        assert_eq!(keywords, vec!["quick", "fox"]);
    }

    #[test]
    fn lowercases_and_caps_at_five() {
        let keywords = extract_keywords("Rust Graph Vector Search Engine Module Extra");
        assert_eq!(keywords.len(), 5);
        assert_eq!(keywords[0], "rust");
    }

    #[test]
    fn empty_after_filtering_yields_empty_list() {
        assert!(extract_keywords("the a an").is_empty());
    }
}
