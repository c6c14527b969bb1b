//! In-process counters and latency histograms, safe for concurrent
//! increment from every handler.
//!
//! Every fallible path also logs via `tracing`. `Metrics` keeps plain
//! `AtomicU64` counters alongside the `metrics` crate's recorder calls so
//! `stats()` can report numbers without requiring a global recorder to
//! be installed (tests run with none).

use metrics::{counter, histogram};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Default)]
pub struct Metrics {
    pub documents_indexed: AtomicU64,
    pub chunks_stored: AtomicU64,
    pub searches_vector: AtomicU64,
    pub searches_graph: AtomicU64,
    pub searches_hybrid: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub errors_vectorizer: AtomicU64,
    pub errors_store: AtomicU64,
    pub errors_cache: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_indexing(&self, chunks: usize, duration: std::time::Duration) {
        self.documents_indexed.fetch_add(1, Ordering::Relaxed);
        self.chunks_stored.fetch_add(chunks as u64, Ordering::Relaxed);
        counter!("knowledge_engine_documents_indexed_total").increment(1);
        counter!("knowledge_engine_chunks_stored_total").increment(chunks as u64);
        histogram!("knowledge_engine_indexing_duration_seconds").record(duration.as_secs_f64());
    }

    pub fn record_search(&self, result_type: crate::store::model::ResultType, duration: std::time::Duration) {
        match result_type {
            crate::store::model::ResultType::Vector => {
                self.searches_vector.fetch_add(1, Ordering::Relaxed);
            }
            crate::store::model::ResultType::Graph => {
                self.searches_graph.fetch_add(1, Ordering::Relaxed);
            }
            crate::store::model::ResultType::Hybrid => {
                self.searches_hybrid.fetch_add(1, Ordering::Relaxed);
            }
        }
        counter!("knowledge_engine_searches_total", "strategy" => format!("{:?}", result_type))
            .increment(1);
        histogram!("knowledge_engine_search_duration_seconds").record(duration.as_secs_f64());
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        counter!("knowledge_engine_cache_hits_total").increment(1);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        counter!("knowledge_engine_cache_misses_total").increment(1);
    }

    pub fn record_error(&self, kind: crate::error::DependencyKind) {
        use crate::error::DependencyKind::*;
        match kind {
            Vectorizer => self.errors_vectorizer.fetch_add(1, Ordering::Relaxed),
            Store => self.errors_store.fetch_add(1, Ordering::Relaxed),
            Cache => self.errors_cache.fetch_add(1, Ordering::Relaxed),
        };
        counter!("knowledge_engine_errors_total", "kind" => kind.to_string()).increment(1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_indexed: self.documents_indexed.load(Ordering::Relaxed),
            chunks_stored: self.chunks_stored.load(Ordering::Relaxed),
            searches_vector: self.searches_vector.load(Ordering::Relaxed),
            searches_graph: self.searches_graph.load(Ordering::Relaxed),
            searches_hybrid: self.searches_hybrid.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }
}

/// Plain-data view of [`Metrics`] suitable for the `stats()` wire format.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    pub documents_indexed: u64,
    pub chunks_stored: u64,
    pub searches_vector: u64,
    pub searches_graph: u64,
    pub searches_hybrid: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// RAII latency stopwatch — `let _t = Stopwatch::start(); ...` records on
/// drop via the passed closure. Small helper so callers don't hand-roll
/// `Instant::now()`/`elapsed()` at every call site.
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Stopwatch { start: Instant::now() }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

/// Install a Prometheus recorder/exporter handle for the process. Spec §1
/// and §4.9 keep the actual `/metrics` HTTP endpoint out of scope — this
/// just returns the `PrometheusHandle` so an (out-of-scope) façade can
/// bind it to a route if it wants to.
pub fn install_prometheus_recorder() -> Result<metrics_exporter_prometheus::PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()
}
