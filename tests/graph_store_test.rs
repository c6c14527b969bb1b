//! `MockGraphStore` exercised directly, with hand-built embeddings — no
//! model download needed, so these run without `--ignored`.

use knowledge_engine::store::graph_store::{GraphStore, MockGraphStore};
use knowledge_engine::store::model::{Chunk, ResultType};
use knowledge_engine::store::ChunkRecord;

fn chunk(content: &str, language: &str, source_doc: &str) -> Chunk {
    let now = chrono::Utc::now();
    Chunk {
        chunk_id: format!("{}-0", source_doc),
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

fn record(content: &str, language: &str, source_doc: &str, embedding: Vec<f32>, intent: Option<&str>) -> ChunkRecord {
    ChunkRecord {
        chunk: chunk(content, language, source_doc),
        embedding,
        intent_name: intent.map(str::to_string),
    }
}

#[tokio::test]
async fn store_chunks_is_idempotent_on_repeated_content() {
    let store = MockGraphStore::new();
    let r = record("the quick brown fox", "en", "doc-a.txt", vec![1.0, 0.0, 0.0], None);

    let n1 = store.store_chunks(&[r.clone()]).await.unwrap();
    let n2 = store.store_chunks(&[r.clone()]).await.unwrap();
    assert_eq!(n1, 1);
    assert_eq!(n2, 1);

    let health = store.health().await.unwrap();
    assert_eq!(health.chunk_count, 1, "same content hashes to the same chunk, so re-storing must not duplicate");
}

#[tokio::test]
async fn vector_knn_ranks_by_cosine_similarity_descending() {
    let store = MockGraphStore::new();
    store
        .store_chunks(&[
            record("alpha document", "en", "doc-a.txt", vec![1.0, 0.0], None),
            record("beta document", "en", "doc-b.txt", vec![0.0, 1.0], None),
            record("gamma document", "en", "doc-c.txt", vec![0.9, 0.1], None),
        ])
        .await
        .unwrap();

    let hits = store.vector_knn(&[1.0, 0.0], 10, None, 0.0).await.unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].source_doc, "doc-a.txt");
    assert_eq!(hits[1].source_doc, "doc-c.txt");
    assert_eq!(hits[2].source_doc, "doc-b.txt");
    assert!(hits.windows(2).all(|w| w[0].vector_score >= w[1].vector_score));
}

#[tokio::test]
async fn vector_knn_honors_language_filter_and_confidence_threshold() {
    let store = MockGraphStore::new();
    store
        .store_chunks(&[
            record("hello world", "en", "doc-a.txt", vec![1.0, 0.0], None),
            record("привіт світ", "uk", "doc-b.txt", vec![1.0, 0.0], None),
        ])
        .await
        .unwrap();

    let en_only = store.vector_knn(&[1.0, 0.0], 10, Some("en"), 0.0).await.unwrap();
    assert_eq!(en_only.len(), 1);
    assert_eq!(en_only[0].language, "en");

    let too_strict = store.vector_knn(&[0.0, 1.0], 10, None, 0.5).await.unwrap();
    assert!(too_strict.is_empty(), "no candidate clears the 0.5 floor against an orthogonal query");
}

#[tokio::test]
async fn graph_search_matches_keywords_case_insensitively() {
    let store = MockGraphStore::new();
    store
        .store_chunks(&[record(
            "Державно-приватне партнерство у сфері освіти",
            "uk",
            "doc-a.txt",
            vec![0.1, 0.2],
            Some("partnership"),
        )])
        .await
        .unwrap();

    let hits = store
        .graph_search(&["ПАРТНЕРСТВО".to_string()], None, None, 10)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].result_type, ResultType::Graph);
    assert_eq!(hits[0].intent_name.as_deref(), Some("partnership"));
}

#[tokio::test]
async fn graph_search_returns_empty_for_empty_keyword_list() {
    let store = MockGraphStore::new();
    store
        .store_chunks(&[record("anything", "en", "doc-a.txt", vec![1.0, 0.0], None)])
        .await
        .unwrap();

    let hits = store.graph_search(&[], None, None, 10).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn walk_bounds_depth_and_tracks_visited_nodes() {
    let store = MockGraphStore::new();
    let a = record("chunk a", "en", "doc.txt", vec![1.0, 0.0], Some("intent-a"));
    let b = record("chunk b", "en", "doc.txt", vec![0.9, 0.1], Some("intent-b"));
    let c = record("chunk c", "en", "doc.txt", vec![0.8, 0.2], Some("intent-c"));
    let start_hash = a.chunk.chunk_hash.clone();

    store.store_chunks(&[a, b, c]).await.unwrap();
    store.add_leads_to("intent-a", "intent-b");
    store.add_leads_to("intent-b", "intent-c");
    // A cycle back to intent-a must not make the walk loop forever.
    store.add_leads_to("intent-c", "intent-a");

    let paths = store.walk(&start_hash, 2, None, 50).await.unwrap();
    assert!(!paths.is_empty());
    assert!(paths.iter().all(|p| p.path_length <= 2));
    assert!(paths.iter().all(|p| p.confidence > 0.0 && p.confidence <= 1.0));
}

#[tokio::test]
async fn walk_bounds_scenario_ranks_shorter_path_above_longer_same_confidence_path() {
    // A-[:DETAILS]->I1-[:LEADS_TO]->I2<-[:DETAILS]-B, B-[:SIMILAR_TO]-C.
    let a = record("chunk a content", "en", "doc.txt", vec![1.0, 0.0], Some("I1"));
    let b = record("chunk b content", "en", "doc.txt", vec![0.9, 0.1], Some("I2"));
    let c = record("chunk c content", "en", "doc.txt", vec![0.8, 0.2], None);
    let a_hash = a.chunk.chunk_hash.clone();
    let b_hash = b.chunk.chunk_hash.clone();
    let c_hash = c.chunk.chunk_hash.clone();

    let store = MockGraphStore::new();
    store.store_chunks(&[a, b, c]).await.unwrap();
    store.add_leads_to("I1", "I2");
    store.add_similar_to(&b_hash, &c_hash);

    let paths = store.walk(&a_hash, 3, None, 50).await.unwrap();
    let path_to_b = paths.iter().find(|p| p.end_node_id == b_hash);
    let path_to_c = paths.iter().find(|p| p.end_node_id == c_hash);
    assert!(path_to_b.is_some(), "A must reach B via DETAILS->LEADS_TO<-DETAILS");
    assert!(path_to_c.is_some(), "A must reach C by continuing through B's SIMILAR_TO edge");
    assert!(path_to_b.unwrap().path_length <= 3);
    assert!(path_to_c.unwrap().path_length <= 3);
    assert!(
        path_to_b.unwrap().path_length < path_to_c.unwrap().path_length,
        "B is strictly closer than C, so ranking by (confidence desc, length asc) must place B first"
    );

    let b_rank = paths.iter().position(|p| p.end_node_id == b_hash).unwrap();
    let c_rank = paths.iter().position(|p| p.end_node_id == c_hash).unwrap();
    assert!(b_rank < c_rank, "the shorter path to B must be ranked ahead of the longer path to C");
}

#[tokio::test]
async fn walk_rejects_start_node_with_no_edges() {
    let store = MockGraphStore::new();
    let lone = record("lonely chunk", "en", "doc.txt", vec![1.0, 0.0], None);
    let hash = lone.chunk.chunk_hash.clone();
    store.store_chunks(&[lone]).await.unwrap();

    let paths = store.walk(&hash, 3, None, 50).await.unwrap();
    assert!(paths.is_empty(), "a chunk with no intent and no similar_to edges has nothing to walk to");
}

#[tokio::test]
async fn facets_dedupes_by_chunk_hash_not_raw_match_count() {
    let store = MockGraphStore::new();
    store
        .store_chunks(&[
            record("education policy reform", "en", "doc-a.txt", vec![1.0, 0.0], Some("policy")),
            record("education policy reform", "en", "doc-a.txt", vec![1.0, 0.0], Some("policy")),
            record("unrelated content here", "en", "doc-b.txt", vec![0.0, 1.0], None),
        ])
        .await
        .unwrap();

    let facets = store.facets("education", None).await.unwrap();
    assert_eq!(facets.languages.get("en").copied().unwrap_or(0), 1, "identical content hashes to one chunk, so the facet count must not double up");
    assert_eq!(facets.sources.get("doc-a.txt").copied().unwrap_or(0), 1);
    assert_eq!(facets.intents.get("policy").copied().unwrap_or(0), 1);
}

#[tokio::test]
async fn suggest_sorts_shortest_match_first_and_respects_limit() {
    let store = MockGraphStore::new();
    store
        .store_chunks(&[
            record("education policy overview document", "en", "doc-a.txt", vec![1.0, 0.0], None),
            record("education", "en", "doc-b.txt", vec![1.0, 0.0], None),
        ])
        .await
        .unwrap();

    let suggestions = store.suggest("education", None, 1).await.unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0], "education");
}

#[tokio::test]
async fn get_chunk_by_hash_returns_none_for_unknown_hash() {
    let store = MockGraphStore::new();
    let result = store.get_chunk_by_hash("nonexistent0000").await.unwrap();
    assert!(result.is_none());
}
