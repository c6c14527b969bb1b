//! Hybrid search engine tests that exercise validation and the result
//! cache without ever calling the vectorizer (which would need a model
//! download) — those reach `embed_query` only after the early-return
//! paths tested here.

use knowledge_engine::config::EngineConfig;
use knowledge_engine::search::SearchQuery;
use knowledge_engine::store::graph_store::MockGraphStore;
use knowledge_engine::store::model::{ResultType, SearchResult};
use knowledge_engine::AppState;
use md5::{Digest, Md5};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn empty_state() -> Arc<AppState> {
    Arc::new(AppState::new(EngineConfig::default(), Arc::new(MockGraphStore::new())))
}

/// Mirrors `SearchQuery::cache_key` (private to the crate) so the test
/// can seed `AppState::search_cache` under the exact key `search()` will
/// probe for.
fn cache_key(q: &SearchQuery) -> String {
    let mut hasher = Md5::new();
    hasher.update(q.query_text.as_bytes());
    hasher.update(q.k.to_le_bytes());
    hasher.update(q.language.as_deref().unwrap_or("").as_bytes());
    hasher.update(q.intent_filter.as_deref().unwrap_or("").as_bytes());
    hasher.update(q.confidence_threshold.to_le_bytes());
    format!("search:{:x}", hasher.finalize())
}

fn sample_result(hash: &str) -> SearchResult {
    SearchResult {
        chunk_hash: hash.to_string(),
        content: "cached content".to_string(),
        language: "en".to_string(),
        source_doc: "doc.txt".to_string(),
        vector_score: 0.9,
        graph_score: 0.0,
        intent_score: 0.0,
        language_score: 0.8,
        combined_score: 0.9,
        result_type: ResultType::Vector,
        intent_name: None,
        phase_name: None,
        graph_distance: 0,
        related_intents: vec![],
        metadata: HashMap::new(),
    }
}

#[tokio::test]
async fn empty_query_text_is_rejected_before_touching_the_vectorizer() {
    let state = empty_state();
    let query = SearchQuery {
        query_text: "   ".to_string(),
        ..SearchQuery::default()
    };
    let result = knowledge_engine::search::search(&state, query, &CancellationToken::new()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn zero_k_is_rejected() {
    let state = empty_state();
    let query = SearchQuery {
        query_text: "valid query".to_string(),
        k: 0,
        ..SearchQuery::default()
    };
    let result = knowledge_engine::search::search(&state, query, &CancellationToken::new()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn a_warm_cache_entry_short_circuits_before_embedding_the_query() {
    let state = empty_state();
    let query = SearchQuery {
        query_text: "cached lookup".to_string(),
        ..SearchQuery::default()
    };

    let seeded = vec![sample_result("abc0000000000000")];
    let encoded = serde_json::to_vec(&seeded).unwrap();
    state.search_cache.insert(cache_key(&query), encoded).await;

    let outcome = knowledge_engine::search::search(&state, query, &CancellationToken::new())
        .await
        .expect("a warm cache entry must short-circuit without needing the vectorizer");

    assert!(outcome.cache_hit);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].chunk_hash, "abc0000000000000");
}
