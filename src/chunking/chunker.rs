//! Chunker (C3).
//!
//! Splits detected-language text into overlapping chunks: recursive
//! separator-based splitting sized to `chunk_size`, an intelligent-overlap
//! pass that borrows trailing sentences from the previous chunk, and a
//! confidence score per chunk based on protected phrases and size.

use crate::lang::tokenizer::TokenizerRegistry;
use crate::lang::{LanguageDetector, LANG_AUTO};
use crate::store::model::Chunk;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub min_chunk_size: usize,
    pub auto_detect_language: bool,
}

impl Default for ChunkerConfig {
    /// Matches `MultilingualDocumentProcessor.__init__`'s defaults exactly.
    fn default() -> Self {
        ChunkerConfig {
            chunk_size: 512,
            chunk_overlap: 128,
            min_chunk_size: 50,
            auto_detect_language: true,
        }
    }
}

pub struct Chunker {
    config: ChunkerConfig,
    detector: LanguageDetector,
    tokenizers: TokenizerRegistry,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Chunker {
            config,
            detector: LanguageDetector::new(),
            tokenizers: TokenizerRegistry::new(),
        }
    }

    /// Chunk `text` (belonging to `source_doc`) into language-aware
    /// pieces. `source_language` is `None`/`"auto"` to request
    /// detection, or a caller-supplied ISO code.
    pub fn process_text(
        &self,
        text: &str,
        source_doc: &str,
        source_language: Option<&str>,
    ) -> Vec<Chunk> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return vec![];
        }

        let wants_auto = source_language.is_none() || source_language == Some(LANG_AUTO);

        let (language, language_confidence) = if wants_auto && self.config.auto_detect_language {
            let detected = self.detector.detect_language(trimmed);
            (detected.code, detected.confidence)
        } else if let Some(meta_lang) = self.detector.detect_from_metadata(source_doc) {
            (meta_lang, 0.8)
        } else {
            (source_language.unwrap_or("en").to_string(), 0.6)
        };

        let tokenizer = self.tokenizers.get(&language);
        let normalized = tokenizer.normalize_text(trimmed);
        let sentences = tokenizer.tokenize_sentences(&normalized);
        if sentences.is_empty() {
            return vec![];
        }

        self.chunk_with_language_rules(
            &sentences,
            tokenizer.as_ref(),
            &language,
            language_confidence,
            source_doc,
        )
    }

    fn chunk_with_language_rules(
        &self,
        sentences: &[String],
        tokenizer: &dyn crate::lang::Tokenizer,
        language: &str,
        language_confidence: f32,
        source_doc: &str,
    ) -> Vec<Chunk> {
        let full_text = sentences.join(" ");
        let raw_chunks = recursive_split(
            &full_text,
            tokenizer.separators(),
            self.config.chunk_size,
            self.config.chunk_overlap,
        );
        let enhanced_chunks =
            apply_intelligent_overlap(&raw_chunks, sentences, self.config.chunk_size);

        let total_chunks = enhanced_chunks.len();
        let mut out = Vec::with_capacity(total_chunks);
        let mut char_position = 0usize;

        for (i, chunk_content) in enhanced_chunks.iter().enumerate() {
            let content = chunk_content.trim().to_string();
            if content.len() < self.config.min_chunk_size {
                continue;
            }

            let chunk_sentences = tokenizer.tokenize_sentences(&content);
            let words: Vec<&str> = content.split_whitespace().collect();
            let has_protected_phrases = !tokenizer.should_split(&content);
            let chunk_confidence = calculate_chunk_confidence(
                language_confidence,
                content.len(),
                self.config.min_chunk_size,
                self.config.chunk_size,
                has_protected_phrases,
            );

            let start_char = char_position;
            let end_char = start_char + content.len();
            char_position = end_char;

            let mut metadata: HashMap<String, serde_json::Value> = HashMap::new();
            metadata.insert("tokenizer".to_string(), serde_json::json!(language));
            metadata.insert(
                "processing_method".to_string(),
                serde_json::json!("multilingual_enhanced"),
            );
            metadata.insert("chunk_index".to_string(), serde_json::json!(i));
            metadata.insert("total_chunks".to_string(), serde_json::json!(total_chunks));
            metadata.insert(
                "has_protected_phrases".to_string(),
                serde_json::json!(has_protected_phrases),
            );
            metadata.insert(
                "language_confidence".to_string(),
                serde_json::json!(language_confidence),
            );

            let chunk_hash = Chunk::hash_content(&content);
            let now = chrono::Utc::now();
            out.push(Chunk {
                chunk_id: format!("{}_{:04}", source_doc, i),
                chunk_hash,
                content,
                language: language.to_string(),
                source_doc: source_doc.to_string(),
                position: i,
                confidence: chunk_confidence,
                metadata,
                word_count: words.len(),
                sentence_count: chunk_sentences.len().max(1),
                start_char,
                end_char,
                created_at: now,
                updated_at: now,
                embedding: None,
            });
        }

        out
    }
}

/// `base × 0.7` if the chunk is under half the minimum size, `× 0.8` if
/// over 1.5× the target size, unchanged otherwise; then `× 1.1` if the
/// chunk contains a protected phrase; capped at 1.0. Matches
/// `_calculate_chunk_confidence` exactly.
fn calculate_chunk_confidence(
    language_confidence: f32,
    content_len: usize,
    min_chunk_size: usize,
    chunk_size: usize,
    has_protected_phrases: bool,
) -> f32 {
    let mut base = language_confidence;
    if (content_len as f32) < (min_chunk_size as f32 * 0.5) {
        base *= 0.7;
    } else if (content_len as f32) > (chunk_size as f32 * 1.5) {
        base *= 0.8;
    }
    if has_protected_phrases {
        base *= 1.1;
    }
    base.min(1.0)
}

/// Greedily split `text` using the coarsest separator from `separators`
/// that still keeps every resulting piece under `chunk_size` (falling
/// back to the finest, `""`, which always succeeds), then merge pieces
/// into chunks of at most `chunk_size` characters, carrying the last
/// `overlap` characters of each chunk into the next. A character-level
/// stand-in for the original's `RecursiveCharacterTextSplitter`.
fn recursive_split(text: &str, separators: &[&str], chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let pieces = split_keeping_separator(text, separators);

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for piece in pieces {
        if piece.len() > chunk_size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(split_by_chars(&piece, chunk_size, overlap));
            continue;
        }

        if current.len() + piece.len() > chunk_size && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            let carry: String = chunks
                .last()
                .map(|last| tail_chars(last, overlap))
                .unwrap_or_default();
            current.push_str(&carry);
        }
        current.push_str(&piece);
    }
    if !current.trim().is_empty() {
        chunks.push(current);
    }

    chunks
}

fn split_keeping_separator(text: &str, separators: &[&str]) -> Vec<String> {
    for sep in separators {
        if sep.is_empty() {
            continue;
        }
        if text.contains(sep) {
            let mut pieces = Vec::new();
            let mut rest = text;
            while let Some(idx) = rest.find(sep) {
                let end = idx + sep.len();
                pieces.push(rest[..end].to_string());
                rest = &rest[end..];
            }
            if !rest.is_empty() {
                pieces.push(rest.to_string());
            }
            return pieces;
        }
    }
    // No separator matched — fall back to the whole text as one piece;
    // the caller's char-level fallback handles anything still oversized.
    vec![text.to_string()]
}

fn split_by_chars(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= chunk_size {
        return vec![text.to_string()];
    }
    let mut out = Vec::new();
    let mut start = 0usize;
    let step = chunk_size.saturating_sub(overlap).max(1);
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        out.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    out
}

fn tail_chars(s: &str, n: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= n {
        s.to_string()
    } else {
        chars[chars.len() - n..].iter().collect()
    }
}

/// For every chunk after the first, prepend the last 1-2 sentences of
/// the previous chunk as context — but only if doing so keeps the
/// result within `chunk_size * 1.1 + 20` characters. Matches
/// `_apply_intelligent_overlap` exactly, including its `+20` slack
/// constant.
fn apply_intelligent_overlap(
    raw_chunks: &[String],
    all_sentences: &[String],
    chunk_size: usize,
) -> Vec<String> {
    if raw_chunks.len() <= 1 {
        return raw_chunks.to_vec();
    }

    let mut enhanced = Vec::with_capacity(raw_chunks.len());
    enhanced.push(raw_chunks[0].clone());

    for i in 1..raw_chunks.len() {
        let previous = &raw_chunks[i - 1];
        let current = &raw_chunks[i];

        let context_sentences = extract_trailing_sentences(previous, all_sentences, 2);
        if context_sentences.is_empty() {
            enhanced.push(current.clone());
            continue;
        }

        let context = context_sentences.join(" ");
        let limit = (chunk_size as f32 * 1.1) as usize + 20;
        if context.len() + current.len() + 20 <= limit {
            enhanced.push(format!("{} {}", context, current));
        } else {
            enhanced.push(current.clone());
        }
    }

    enhanced
}

/// Find which sentences (by substring containment) make up `chunk`, and
/// return the last `max_count` of them.
fn extract_trailing_sentences(chunk: &str, all_sentences: &[String], max_count: usize) -> Vec<String> {
    let constituent: Vec<String> = all_sentences
        .iter()
        .filter(|s| chunk.contains(s.as_str()))
        .cloned()
        .collect();
    let start = constituent.len().saturating_sub(max_count);
    constituent[start..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunker = Chunker::new(ChunkerConfig::default());
        assert!(chunker.process_text("   ", "doc", Some("en")).is_empty());
    }

    #[test]
    fn short_text_yields_one_chunk_with_metadata() {
        let chunker = Chunker::new(ChunkerConfig::default());
        let chunks = chunker.process_text(
            "This is a short piece of English text about machine learning systems.",
            "doc1",
            Some("en"),
        );
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].language, "en");
        assert_eq!(chunks[0].chunk_id, "doc1_0000");
        assert!(!chunks[0].chunk_hash.is_empty());
    }

    #[test]
    fn below_min_size_chunks_are_dropped() {
        let mut config = ChunkerConfig::default();
        config.min_chunk_size = 1000;
        let chunker = Chunker::new(config);
        let chunks = chunker.process_text("Too short.", "doc2", Some("en"));
        assert!(chunks.is_empty());
    }

    #[test]
    fn long_text_produces_multiple_overlapping_chunks() {
        let mut config = ChunkerConfig::default();
        config.chunk_size = 100;
        config.chunk_overlap = 20;
        config.min_chunk_size = 10;
        let chunker = Chunker::new(config);
        let paragraph = "Machine learning models require large amounts of data. ".repeat(20);
        let chunks = chunker.process_text(&paragraph, "doc3", Some("en"));
        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.position, i);
        }
    }

    #[test]
    fn confidence_penalizes_undersized_chunks() {
        let score = calculate_chunk_confidence(0.8, 10, 50, 512, false);
        assert!((score - 0.8 * 0.7).abs() < 1e-6);
    }

    #[test]
    fn confidence_bonus_for_protected_phrases_caps_at_one() {
        let score = calculate_chunk_confidence(0.95, 200, 50, 512, true);
        assert!(score <= 1.0);
    }
}
