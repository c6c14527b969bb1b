//! Vectorizer (C4): Model2Vec embedding, loaded once and reused.
//!
//! The lazy-load-via-`OnceCell`-plus-`spawn_blocking` pattern is kept
//! from `src/features/history.rs`'s `MemoryManager`; `cosine_similarity`
//! is moved here verbatim from `src/nlp/semantic_shave.rs`, which is
//! exactly where it conceptually belongs now that embedding lives in its
//! own module.

use crate::error::{DependencyKind, EngineError, Result};
use model2vec_rs::model::StaticModel;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub struct Vectorizer {
    model_id: String,
    max_seq_length: usize,
    /// Spec §4.4 "Normalization": when on (the default), `encode`/
    /// `encode_batch` L2-normalize their output so dot product equals
    /// cosine similarity downstream.
    normalize: bool,
    model: OnceCell<Arc<StaticModel>>,
}

impl Vectorizer {
    pub fn new(model_id: impl Into<String>, max_seq_length: usize) -> Self {
        Vectorizer {
            model_id: model_id.into(),
            max_seq_length,
            normalize: true,
            model: OnceCell::new(),
        }
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn max_seq_length(&self) -> usize {
        self.max_seq_length
    }

    async fn get_model(&self) -> Result<Arc<StaticModel>> {
        self.model
            .get_or_try_init(|| async {
                let model_id = self.model_id.clone();
                tokio::task::spawn_blocking(move || {
                    StaticModel::from_pretrained(&model_id, None, None, None)
                        .map(Arc::new)
                        .map_err(|e| {
                            EngineError::dependency(DependencyKind::Vectorizer, e.to_string())
                        })
                })
                .await
                .map_err(|e| EngineError::dependency(DependencyKind::Vectorizer, e.to_string()))?
            })
            .await
            .cloned()
    }

    /// Dimensionality of the embeddings this vectorizer produces. Probes
    /// the model with a one-word input the first time it's called.
    pub async fn dimension(&self) -> Result<usize> {
        let model = self.get_model().await?;
        let probe = tokio::task::spawn_blocking(move || model.encode_single("dimension probe"))
            .await
            .map_err(|e| EngineError::dependency(DependencyKind::Vectorizer, e.to_string()))?;
        Ok(probe.len())
    }

    pub async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let model = self.get_model().await?;
        let text = text.to_string();
        let normalize = self.normalize;
        tokio::task::spawn_blocking(move || {
            let mut v = model.encode_single(&text);
            if normalize {
                l2_normalize(&mut v);
            }
            v
        })
        .await
        .map_err(|e| EngineError::dependency(DependencyKind::Vectorizer, e.to_string()))
    }

    pub async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let model = self.get_model().await?;
        let texts = texts.to_vec();
        let normalize = self.normalize;
        tokio::task::spawn_blocking(move || {
            let mut vectors = model.encode(&texts);
            if normalize {
                for v in vectors.iter_mut() {
                    l2_normalize(v);
                }
            }
            vectors
        })
        .await
        .map_err(|e| EngineError::dependency(DependencyKind::Vectorizer, e.to_string()))
    }

    /// Score `candidates` against `query` by cosine similarity and return
    /// the top `k`, highest first (spec §4.4 `top_k_similar`).
    pub fn top_k_similar<'a>(
        &self,
        query: &[f32],
        candidates: &'a [(String, Vec<f32>)],
        k: usize,
    ) -> Vec<(&'a str, f32)> {
        let mut scored: Vec<(&str, f32)> = candidates
            .iter()
            .map(|(id, vector)| (id.as_str(), cosine_similarity(query, vector)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    /// Cosine similarity between two already-embedded texts (spec §4.4
    /// `similarity`).
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        cosine_similarity(a, b)
    }

    /// Self-reported state for the `stats()` wire operation (spec §6).
    pub fn stats(&self) -> serde_json::Value {
        serde_json::json!({
            "model_id": self.model_id,
            "max_seq_length": self.max_seq_length,
            "normalize": self.normalize,
            "model_loaded": self.model.initialized(),
        })
    }

    /// No persistent resources to release — `StaticModel` is dropped
    /// with the `Arc` when the last `AppState` clone goes away. Kept as
    /// an explicit async no-op so callers have a `close()` to call
    /// (spec §4.4's operation list) without relying on `Drop` timing.
    pub async fn close(&self) {}
}

fn l2_normalize(v: &mut [f32]) {
    let magnitude: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for x in v.iter_mut() {
            *x /= magnitude;
        }
    }
}

/// Cosine similarity between two f32 vectors. Returns 0.0 if either
/// vector has zero magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    (dot / (mag_a * mag_b)).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn zero_magnitude_returns_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn mismatched_length_returns_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }
}
