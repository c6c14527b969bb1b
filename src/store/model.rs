//! Domain types shared across chunking, embedding, storage, and search.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Per-chunk metadata produced by the chunker. Kept as an open map
/// (rather than a closed struct) because the store persists it
/// opaquely and downstream consumers (intent linking, facets) only
/// ever read a handful of well-known keys out of it.
pub type ChunkMetadata = HashMap<String, serde_json::Value>;

/// A language-aware slice of a source document, ready for embedding
/// and graph storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: String,
    pub chunk_hash: String,
    pub content: String,
    pub language: String,
    pub source_doc: String,
    pub position: usize,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
    pub word_count: usize,
    pub sentence_count: usize,
    pub start_char: usize,
    pub end_char: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    /// Omitted on the wire unless a caller explicitly asks for vectors
    /// (spec §6 "vector payloads are omitted by default on the result
    /// path"); populated from `ChunkRecord` on writes, left `None` on
    /// reads that don't request it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    /// SHA-256 of the content, truncated to 16 hex characters — matches
    /// `DocChunk.__post_init__`'s `hashlib.sha256(...).hexdigest()[:16]`.
    pub fn hash_content(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let digest = hasher.finalize();
        let full_hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        full_hex[..16].to_string()
    }
}

/// A document node in the graph — one per distinct `source_doc` value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// An intent node in the graph, linked from chunks via `DETAILS` and to
/// other intents via `LEADS_TO`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A path discovered by a graph walk, with a confidence that decays
/// along each traversed edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphPath {
    pub start_node_id: String,
    pub end_node_id: String,
    pub path_nodes: Vec<String>,
    pub relationships: Vec<String>,
    pub path_length: usize,
    pub confidence: f32,
    pub total_weight: f32,
}

impl GraphPath {
    pub fn path_summary(&self) -> String {
        format!(
            "{} -> {} ({} hops, confidence {:.2})",
            self.start_node_id, self.end_node_id, self.path_length, self.confidence
        )
    }
}

/// How a search result was found, surfaced so callers can tell a
/// vector-only hit from one corroborated by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    Vector,
    Graph,
    Hybrid,
}

/// A scored search hit, carrying enough per-arm detail (vector/graph/
/// intent/language scores, `result_type`) to explain how it was ranked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk_hash: String,
    pub content: String,
    pub language: String,
    pub source_doc: String,
    #[serde(default)]
    pub vector_score: f32,
    #[serde(default)]
    pub graph_score: f32,
    #[serde(default)]
    pub intent_score: f32,
    #[serde(default)]
    pub language_score: f32,
    pub combined_score: f32,
    pub result_type: ResultType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_name: Option<String>,
    #[serde(default)]
    pub graph_distance: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_intents: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Facet counts over a result set, deduplicated by `chunk_hash` before
/// counting (see `DESIGN.md` for why raw Cypher `count(*)` overcounts).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFacets {
    pub languages: HashMap<String, usize>,
    pub intents: HashMap<String, usize>,
    pub phases: HashMap<String, usize>,
    pub sources: HashMap<String, usize>,
    pub result_types: HashMap<String, usize>,
}

/// Outcome of indexing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingResult {
    pub success: bool,
    pub document_name: String,
    pub chunks_created: usize,
    pub chunks_indexed: usize,
    pub processing_time_ms: u64,
    pub language_detected: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
