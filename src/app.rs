//! `AppState` — the capability container every core operation hangs off.
//!
//! A plain `Clone`-able struct of `Arc<dyn Trait>`/`moka` fields built once
//! at startup and threaded through every handler, with a `Debug` impl that
//! reports flags rather than dumping internals.

use crate::chunking::{Chunker, ChunkerConfig};
use crate::config::EngineConfig;
use crate::embedding::{EmbeddingCache, Vectorizer};
use crate::error::{EngineError, Result};
use crate::store::GraphStore;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// The capability container. One instance lives for the process lifetime;
/// every public operation (`index_document`, `search`, `walk`, ...) is an
/// inherent method here so the core stays transport-agnostic (spec §6).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EngineConfig>,
    pub chunker: Arc<Chunker>,
    pub vectorizer: Arc<Vectorizer>,
    pub embedding_cache: Arc<EmbeddingCache>,
    pub store: Arc<dyn GraphStore>,
    /// Search-result cache, keyed by `search::engine::cache_key`. Separate
    /// from `embedding_cache` — different TTL, different key scheme (spec
    /// §4.7 step 1 vs §4.4's cache).
    pub search_cache: Cache<String, Vec<u8>>,
    /// Bounds how many `index_document` calls run concurrently (spec §5's
    /// indexing backpressure queue).
    pub indexing_semaphore: Arc<tokio::sync::Semaphore>,
    pub metrics: Arc<crate::telemetry::metrics::Metrics>,
    /// Caches the vectorizer's probed dimension so every `store_chunks`
    /// call doesn't re-run the self-test embed (spec §3 "dimension D
    /// fixed at store initialization").
    dim_cache: Arc<OnceCell<usize>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("embedding_model", &self.vectorizer.model_id())
            .field("chunk_size", &self.config.chunking.resolve_chunk_size())
            .finish()
    }
}

impl AppState {
    /// Build an `AppState` against a live Neo4j store.
    pub async fn connect(config: EngineConfig) -> Result<Self> {
        let store = crate::store::graph_store::Neo4rsStore::connect(
            &config.neo4j.resolve_uri(),
            &config.neo4j.resolve_user(),
            &config.neo4j.resolve_password(),
        )
        .await?;
        Ok(Self::new(config, Arc::new(store)))
    }

    /// Build an `AppState` over any `GraphStore` (the live Neo4j backend,
    /// or `MockGraphStore` for tests) — the injection seam spec §9 asks
    /// for ("expose factory functions for tests to inject fakes").
    pub fn new(config: EngineConfig, store: Arc<dyn GraphStore>) -> Self {
        let config = Arc::new(config);
        let chunker_config = ChunkerConfig {
            chunk_size: config.chunking.resolve_chunk_size(),
            chunk_overlap: config.chunking.resolve_chunk_overlap(),
            min_chunk_size: config.chunking.resolve_min_chunk_size(),
            auto_detect_language: config.chunking.resolve_auto_detect_language(),
        };

        AppState {
            vectorizer: Arc::new(Vectorizer::new(config.resolve_embedding_model(), 512)),
            embedding_cache: Arc::new(EmbeddingCache::new(
                10_000,
                Duration::from_secs(config.resolve_embedding_cache_ttl_secs()),
            )),
            search_cache: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(config.resolve_search_cache_ttl_secs()))
                .build(),
            chunker: Arc::new(Chunker::new(chunker_config)),
            store,
            indexing_semaphore: Arc::new(tokio::sync::Semaphore::new(32)),
            metrics: Arc::new(crate::telemetry::metrics::Metrics::new()),
            dim_cache: Arc::new(OnceCell::new()),
            config,
        }
    }

    /// Embedding dimensionality of this deployment's vectorizer, probed
    /// once and cached (spec §3 "dimension D fixed at store
    /// initialization").
    pub async fn embedding_dim(&self) -> Result<usize> {
        self.dim_cache
            .get_or_try_init(|| async { self.vectorizer.dimension().await })
            .await
            .copied()
    }

    /// Embed `texts` through the cache: probe the cache for every input
    /// first, submit only the miss subset to the model in one batch call,
    /// and write the misses back with the configured TTL — spec §4.4
    /// "Cache is probed for all inputs first; only the miss subset is
    /// submitted to the model... Order-preservation is required."
    pub async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let keys: Vec<String> = texts
            .iter()
            .map(|t| {
                crate::embedding::cache::EmbeddingCache::key(
                    self.vectorizer.model_id(),
                    self.vectorizer.max_seq_length(),
                    t,
                )
            })
            .collect();

        let mut results: Vec<Option<Vec<f32>>> = Vec::with_capacity(texts.len());
        for key in &keys {
            results.push(self.embedding_cache.get(key).await);
        }

        let mut miss_indices = Vec::new();
        let mut miss_texts = Vec::new();
        for (i, slot) in results.iter().enumerate() {
            if slot.is_none() {
                miss_indices.push(i);
                miss_texts.push(texts[i].clone());
            }
        }

        if !miss_texts.is_empty() {
            let fresh = self.vectorizer.encode_batch(&miss_texts).await?;
            for (idx, vector) in miss_indices.iter().zip(fresh.into_iter()) {
                self.embedding_cache
                    .insert(keys[*idx].clone(), vector.clone())
                    .await;
                results[*idx] = Some(vector);
            }
        }

        Ok(results.into_iter().map(|v| v.unwrap_or_default()).collect())
    }

    /// Low-level bulk ingest used by tests and bulk importers (spec §6).
    /// Validates every record's embedding length against this
    /// deployment's `D` before touching the store at all — a dimension
    /// mismatch anywhere in the batch fails the whole call with no
    /// partial write (spec §8 scenario 6).
    pub async fn store_chunks(
        &self,
        records: &[crate::store::ChunkRecord],
    ) -> Result<usize> {
        let expected_dim = self.embedding_dim().await?;
        for record in records {
            if record.embedding.len() != expected_dim {
                return Err(EngineError::invalid_input(format!(
                    "embedding length {} does not match store dimension {}",
                    record.embedding.len(),
                    expected_dim
                )));
            }
        }
        self.store.store_chunks(records).await
    }
}

pub(crate) fn invalid_k(k: usize) -> Result<usize> {
    if k == 0 {
        return Err(EngineError::invalid_input("k must be > 0"));
    }
    Ok(k.min(100))
}
