//! `AppState::embed_texts`'s cache-probe path, exercised with every
//! input pre-seeded as a cache hit so the call never reaches the
//! vectorizer (no model download needed).

use knowledge_engine::config::EngineConfig;
use knowledge_engine::embedding::cache::EmbeddingCache;
use knowledge_engine::store::graph_store::MockGraphStore;
use knowledge_engine::AppState;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn state() -> Arc<AppState> {
    Arc::new(AppState::new(EngineConfig::default(), Arc::new(MockGraphStore::new())))
}

#[tokio::test]
async fn all_cache_hits_preserve_input_order_without_touching_the_model() {
    let state = state();
    let texts = vec![
        "first text".to_string(),
        "second text".to_string(),
        "third text".to_string(),
    ];
    let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]];

    for (text, vector) in texts.iter().zip(vectors.iter()) {
        let key = EmbeddingCache::key(state.vectorizer.model_id(), state.vectorizer.max_seq_length(), text);
        state.embedding_cache.insert(key, vector.clone()).await;
    }

    let result = state.embed_texts(&texts).await.expect("every input is a cache hit");
    assert_eq!(result, vectors);
}

#[tokio::test]
async fn empty_input_returns_empty_output() {
    let state = state();
    let result = state.embed_texts(&[]).await.unwrap();
    assert!(result.is_empty());
}
