//! End-to-end indexing + hybrid search through a live `Vectorizer`.
//!
//! These download and load the Model2Vec embedding model on first run,
//! so they're `#[ignore]`d like the other network-dependent tests in
//! this suite — run with `cargo test --test full_pipeline_test -- --ignored`.

use knowledge_engine::config::EngineConfig;
use knowledge_engine::pipeline::{index_document, IndexingRequest};
use knowledge_engine::search::{self, SearchQuery};
use knowledge_engine::store::graph_store::MockGraphStore;
use knowledge_engine::AppState;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn state() -> Arc<AppState> {
    Arc::new(AppState::new(EngineConfig::default(), Arc::new(MockGraphStore::new())))
}

#[tokio::test]
#[ignore]
async fn indexing_a_document_then_searching_for_it_finds_it() {
    let state = state();

    let text = "Державно-приватне партнерство є ключовим інструментом реформи освіти. \
                Другий абзац описує фінансування освітніх програм у регіонах.";
    let result = index_document(
        &state,
        IndexingRequest {
            filename: "education_policy.txt".to_string(),
            bytes: text.as_bytes().to_vec(),
            declared_language: Some("uk".to_string()),
            intent_name: Some("education_policy".to_string()),
        },
    )
    .await;

    assert!(result.success, "indexing should succeed: {:?}", result.error_message);
    assert!(result.chunks_created > 0);
    assert_eq!(result.language_detected, "uk");

    let outcome = search::search(
        &state,
        SearchQuery {
            query_text: "партнерство освіти".to_string(),
            k: 5,
            ..SearchQuery::default()
        },
        &CancellationToken::new(),
    )
    .await
    .expect("search should succeed against a freshly indexed document");

    assert!(!outcome.results.is_empty());
    assert!(!outcome.cache_hit, "first call for a new query must be a miss");
}

#[tokio::test]
#[ignore]
async fn a_repeated_query_is_served_from_the_result_cache() {
    let state = state();
    index_document(
        &state,
        IndexingRequest {
            filename: "notes.txt".to_string(),
            bytes: b"Quarterly revenue grew fourteen percent year over year.".to_vec(),
            declared_language: Some("en".to_string()),
            intent_name: None,
        },
    )
    .await;

    let query = || SearchQuery {
        query_text: "quarterly revenue".to_string(),
        k: 5,
        ..SearchQuery::default()
    };

    let first = search::search(&state, query(), &CancellationToken::new()).await.unwrap();
    assert!(!first.cache_hit);

    let second = search::search(&state, query(), &CancellationToken::new()).await.unwrap();
    assert!(second.cache_hit);
    assert_eq!(
        first.results.iter().map(|r| &r.chunk_hash).collect::<Vec<_>>(),
        second.results.iter().map(|r| &r.chunk_hash).collect::<Vec<_>>(),
        "the cached page must return the same ordering as the original call"
    );
}

#[tokio::test]
#[ignore]
async fn store_chunks_rejects_a_batch_with_a_mismatched_embedding_dimension() {
    use knowledge_engine::store::model::Chunk;
    use knowledge_engine::store::ChunkRecord;

    let state = state();
    // Force the dimension cache to populate against the real model.
    let dim = state.embedding_dim().await.expect("probe dimension");

    let now = chrono::Utc::now();
    let bad_record = ChunkRecord {
        chunk: Chunk {
            chunk_id: "bad-0".to_string(),
            chunk_hash: Chunk::hash_content("mismatched"),
            content: "mismatched".to_string(),
            language: "en".to_string(),
            source_doc: "bad.txt".to_string(),
            position: 0,
            confidence: 1.0,
            metadata: Default::default(),
            word_count: 1,
            sentence_count: 1,
            start_char: 0,
            end_char: 10,
            created_at: now,
            updated_at: now,
            embedding: None,
        },
        embedding: vec![0.0; dim + 1],
        intent_name: None,
    };

    let result = state.store_chunks(&[bad_record]).await;
    assert!(result.is_err(), "a dimension mismatch must fail the whole batch atomically");
}

#[tokio::test]
#[ignore]
async fn vector_search_runs_the_vector_arm_alone() {
    let state = state();
    index_document(
        &state,
        IndexingRequest {
            filename: "single.txt".to_string(),
            bytes: b"The annual report covers budget allocations for next year.".to_vec(),
            declared_language: Some("en".to_string()),
            intent_name: None,
        },
    )
    .await;

    let results = search::engine::vector_search(&state, "annual budget report", Some("en"), 5, 0.0)
        .await
        .expect("vector search should succeed");
    assert!(!results.is_empty());
    assert!(results
        .iter()
        .all(|r| r.result_type == knowledge_engine::store::model::ResultType::Vector));
}
