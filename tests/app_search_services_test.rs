//! `facets`/`suggest`/`walk` exercised through `AppState` with a
//! `MockGraphStore` backend. None of these three touch the vectorizer,
//! so they run without network access or a model download.

use knowledge_engine::config::EngineConfig;
use knowledge_engine::search;
use knowledge_engine::store::graph_store::{GraphStore, MockGraphStore};
use knowledge_engine::store::model::Chunk;
use knowledge_engine::store::ChunkRecord;
use knowledge_engine::AppState;
use std::sync::Arc;

fn chunk(content: &str, language: &str, source_doc: &str) -> Chunk {
    let now = chrono::Utc::now();
    Chunk {
        chunk_id: format!("{source_doc}-0"),
        chunk_hash: Chunk::hash_content(content),
        content: content.to_string(),
        language: language.to_string(),
        source_doc: source_doc.to_string(),
        position: 0,
        confidence: 0.9,
        metadata: Default::default(),
        word_count: content.split_whitespace().count(),
        sentence_count: 1,
        start_char: 0,
        end_char: content.len(),
        created_at: now,
        updated_at: now,
        embedding: None,
    }
}

fn empty_state() -> Arc<AppState> {
    let store = MockGraphStore::new();
    Arc::new(AppState::new(EngineConfig::default(), Arc::new(store)))
}

#[tokio::test]
async fn walk_rejects_depth_outside_bounds() {
    let state = empty_state();

    let zero = search::walk(&state, "anyhash0000000000", 0, None, 0.0).await;
    assert!(zero.is_err(), "max_depth=0 must be rejected");

    let too_deep = search::walk(&state, "anyhash0000000000", 6, None, 0.0).await;
    assert!(too_deep.is_err(), "max_depth beyond MAX_WALK_DEPTH must be rejected");

    let ok = search::walk(&state, "anyhash0000000000", 1, None, 0.0).await;
    assert!(ok.is_ok(), "an in-range depth against an unknown start must return an empty list, not an error");
    assert!(ok.unwrap().is_empty());
}

#[tokio::test]
async fn walk_filters_paths_below_confidence_floor() {
    let store = Arc::new(MockGraphStore::new());
    let a = ChunkRecord {
        chunk: chunk("first chunk", "en", "doc.txt"),
        embedding: vec![1.0, 0.0],
        intent_name: Some("intent-a".to_string()),
    };
    let b = ChunkRecord {
        chunk: chunk("second chunk", "en", "doc.txt"),
        embedding: vec![0.9, 0.1],
        intent_name: Some("intent-b".to_string()),
    };
    let start_hash = a.chunk.chunk_hash.clone();
    store.store_chunks(&[a, b]).await.unwrap();
    store.add_leads_to("intent-a", "intent-b");

    let state = Arc::new(AppState::new(EngineConfig::default(), store));

    // A single hop decays confidence to 0.8 (MockGraphStore's
    // DEFAULT_EDGE_CONFIDENCE); a floor above that must drop everything.
    let filtered = search::walk(&state, &start_hash, 2, None, 0.9).await.unwrap();
    assert!(filtered.is_empty());

    let permissive = search::walk(&state, &start_hash, 2, None, 0.0).await.unwrap();
    assert!(!permissive.is_empty());
}

#[tokio::test]
async fn facets_response_sums_per_dimension_totals() {
    let store = Arc::new(MockGraphStore::new());
    store
        .store_chunks(&[
            ChunkRecord {
                chunk: chunk("education policy reform", "en", "doc-a.txt"),
                embedding: vec![1.0, 0.0],
                intent_name: Some("policy".to_string()),
            },
            ChunkRecord {
                chunk: chunk("education funding update", "uk", "doc-b.txt"),
                embedding: vec![0.0, 1.0],
                intent_name: Some("funding".to_string()),
            },
        ])
        .await
        .unwrap();

    let state = Arc::new(AppState::new(EngineConfig::default(), store));
    let response = search::facets(&state, "education", None).await.unwrap();

    assert_eq!(response.total_languages, 2);
    assert_eq!(response.total_sources, 2);
    assert_eq!(response.total_intents, 2);
    assert_eq!(response.facets.languages.len(), 2);
}

#[tokio::test]
async fn suggest_rejects_nothing_but_clamps_limit_range() {
    let state = empty_state();
    // limit=0 clamps up to 1 rather than erroring (store.suggest tolerates an empty store).
    let suggestions = search::suggest(&state, "anything", None, 0).await.unwrap();
    assert!(suggestions.is_empty());
}
