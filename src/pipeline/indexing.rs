//! Indexing Pipeline (C6).
//!
//! extract → chunk → embed → store, returning an `IndexingResult` even on
//! partial failure rather than propagating. The store write retries with
//! exponential backoff via `backoff::future::retry`.

use crate::app::AppState;
use crate::error::{DependencyKind, EngineError, Result};
use crate::store::{ChunkRecord, IndexingResult};
use backoff::future::retry;
use backoff::ExponentialBackoffBuilder;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// A document to index: raw bytes plus the filename used both for
/// format-extraction dispatch (`chunking::extract`) and as the store's
/// `source_doc` key.
pub struct IndexingRequest {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub declared_language: Option<String>,
    /// Optional `Intent.name` to link every chunk of this document to
    /// (spec §3's `DETAILS` edge); `None` skips intent linking entirely.
    pub intent_name: Option<String>,
}

/// Why an indexing attempt failed, for logging/metrics only — the crate
/// never surfaces this to callers as a distinct error type, matching
/// spec §4.6's "errors are captured into the result, not propagated".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Extraction,
    Chunking,
    Embedding,
    Store,
}

/// Run the full index pipeline for one document. Extraction and chunking
/// errors are terminal (not retried); store writes retry transient
/// failures 3 times with 1/2/4s backoff before giving up.
pub async fn index_document(state: &AppState, request: IndexingRequest) -> IndexingResult {
    let start = Instant::now();
    let document_name = request.filename.clone();

    match index_document_inner(state, request).await {
        Ok((chunks_created, language)) => {
            let result = IndexingResult {
                success: true,
                document_name,
                chunks_created,
                chunks_indexed: chunks_created,
                processing_time_ms: start.elapsed().as_millis() as u64,
                language_detected: language,
                error_message: None,
            };
            state.metrics.record_indexing(chunks_created, start.elapsed());
            result
        }
        Err((category, err)) => {
            warn!(document = %document_name, ?category, error = %err, "indexing failed");
            if let EngineError::Dependency { kind, .. } = &err {
                state.metrics.record_error(*kind);
            }
            IndexingResult {
                success: false,
                document_name,
                chunks_created: 0,
                chunks_indexed: 0,
                processing_time_ms: start.elapsed().as_millis() as u64,
                language_detected: "unknown".to_string(),
                error_message: Some(err.to_string()),
            }
        }
    }
}

async fn index_document_inner(
    state: &AppState,
    request: IndexingRequest,
) -> std::result::Result<(usize, String), (ErrorCategory, EngineError)> {
    let _permit = state
        .indexing_semaphore
        .acquire()
        .await
        .map_err(|e| (ErrorCategory::Store, EngineError::from(anyhow::anyhow!(e))))?;

    let text = crate::chunking::extract::extract_text(&request.bytes, &request.filename)
        .map_err(|e| (ErrorCategory::Extraction, e))?;

    let chunks = state.chunker.process_text(
        &text,
        &request.filename,
        request.declared_language.as_deref(),
    );

    if chunks.is_empty() {
        return Ok((0, "unknown".to_string()));
    }

    let language = chunks[0].language.clone();

    let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let vectors = state
        .embed_texts(&contents)
        .await
        .map_err(|e| (ErrorCategory::Embedding, e))?;

    if vectors.len() != chunks.len() {
        return Err((
            ErrorCategory::Embedding,
            EngineError::from(anyhow::anyhow!(
                "embedding count mismatch: {} chunks but {} vectors",
                chunks.len(),
                vectors.len()
            )),
        ));
    }

    let records: Vec<ChunkRecord> = chunks
        .into_iter()
        .zip(vectors.into_iter())
        .map(|(chunk, embedding)| ChunkRecord {
            chunk,
            embedding,
            intent_name: request.intent_name.clone(),
        })
        .collect();

    let chunks_created = records.len();

    store_with_retry(state, &records)
        .await
        .map_err(|e| (ErrorCategory::Store, e))?;

    info!(document = %request.filename, chunks = chunks_created, %language, "document indexed");
    Ok((chunks_created, language))
}

/// Retry transient store failures 3 times with 1/2/4s backoff. Permanent
/// errors (anything that isn't `EngineError::is_retryable`) fail fast.
async fn store_with_retry(state: &AppState, records: &[ChunkRecord]) -> Result<usize> {
    let backoff = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_secs(1))
        .with_multiplier(2.0)
        .with_max_interval(Duration::from_secs(4))
        .with_max_elapsed_time(Some(Duration::from_secs(7)))
        .build();

    retry(backoff, || async {
        match state.store_chunks(records).await {
            Ok(n) => Ok(n),
            Err(e) if e.is_retryable() => Err(backoff::Error::transient(e)),
            Err(e) => Err(backoff::Error::permanent(e)),
        }
    })
    .await
    .map_err(|e| match e {
        backoff::Error::Permanent(e) => e,
        backoff::Error::Transient { err, .. } => {
            EngineError::dependency(DependencyKind::Store, err.to_string())
        }
    })
}
