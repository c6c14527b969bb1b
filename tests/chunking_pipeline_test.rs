//! Chunker + extractor exercised end to end, no model/network needed —
//! only the language-aware splitting and file-format extraction layers.

use knowledge_engine::chunking::{Chunker, ChunkerConfig};

fn chunker() -> Chunker {
    Chunker::new(ChunkerConfig::default())
}

#[test]
fn empty_document_produces_no_chunks() {
    let chunks = chunker().process_text("   \n\t  ", "empty.txt", None);
    assert!(chunks.is_empty());
}

#[test]
fn short_document_becomes_a_single_chunk_with_stable_hash() {
    let text = "The quick brown fox jumps over the lazy dog.";
    let chunks = chunker().process_text(text, "fox.txt", Some("en"));
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_hash, knowledge_engine::store::model::Chunk::hash_content(text));
    assert_eq!(chunks[0].source_doc, "fox.txt");
    assert_eq!(chunks[0].language, "en");
}

#[test]
fn long_document_splits_into_overlapping_chunks() {
    let sentence = "This sentence repeats to pad the document out long enough to split. ";
    let text = sentence.repeat(40);
    let chunks = chunker().process_text(&text, "long.txt", Some("en"));
    assert!(chunks.len() > 1, "a document well past chunk_size must split into multiple chunks");
    for w in chunks.windows(2) {
        assert!(w[0].position < w[1].position);
    }
    // Every chunk must individually respect the minimum size floor or be the
    // final (necessarily short) remainder.
    for (i, c) in chunks.iter().enumerate() {
        if i + 1 < chunks.len() {
            assert!(c.content.len() >= 10, "interior chunks should not be near-empty slivers");
        }
    }
}

#[test]
fn ukrainian_text_is_chunked_with_the_ukrainian_tokenizer() {
    let text = "Державно-приватне партнерство у сфері освіти. Це другий важливий момент.";
    let chunks = chunker().process_text(text, "policy_uk.txt", Some("uk"));
    assert!(!chunks.is_empty());
    assert_eq!(chunks[0].language, "uk");
    assert!(chunks.iter().any(|c| c.content.contains("партнерство")));
}

#[test]
fn auto_language_detection_falls_back_when_disabled() {
    let mut config = ChunkerConfig::default();
    config.auto_detect_language = false;
    let chunker = Chunker::new(config);
    let chunks = chunker.process_text("Some english text here.", "untitled", None);
    assert!(!chunks.is_empty());
    assert_eq!(chunks[0].language, "en");
}

#[test]
fn ukrainian_compound_preservation_scenario() {
    let text = "Державно-приватне партнерство в інформаційно-комунікаційних технологіях.";
    let chunks = chunker().process_text(text, "auto_doc.txt", Some("auto"));
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].language, "uk");
    assert!(chunks[0].confidence >= 0.7);
    assert!(chunks[0].content.to_lowercase().contains("державно-приватне"));
}

#[test]
fn chunk_confidence_is_bounded_in_unit_interval() {
    let chunks = chunker().process_text("A short sentence.", "a.txt", Some("en"));
    for c in &chunks {
        assert!(c.confidence >= 0.0 && c.confidence <= 1.0);
    }
}
