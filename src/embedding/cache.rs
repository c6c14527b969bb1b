//! TTL cache in front of the vectorizer.
//!
//! Keyed on `emb:{model}:{max_seq_length}:{sha256(text)}` (full
//! 64-hex-char digest) with TTL-based expiry. Held in-process via
//! `moka::future::Cache`, so entries never need compression or
//! serialization the way an out-of-process cache would.

use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::time::Duration;

pub struct EmbeddingCache {
    cache: Cache<String, Vec<f32>>,
}

impl EmbeddingCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        EmbeddingCache {
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .support_invalidation_closures()
                .build(),
        }
    }

    pub fn key(model_id: &str, max_seq_length: usize, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let digest = hasher.finalize();
        let text_hash: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        let model_version = model_id.replace('/', "_");
        format!("emb:{}:{}:{}", model_version, max_seq_length, text_hash)
    }

    pub async fn get(&self, key: &str) -> Option<Vec<f32>> {
        self.cache.get(key).await
    }

    pub async fn insert(&self, key: String, embedding: Vec<f32>) {
        self.cache.insert(key, embedding).await;
    }

    /// Spec §4.4 `clear_cache(pattern?)`: drop every entry whose key
    /// contains `pattern`, or everything when `pattern` is `None`.
    pub async fn clear(&self, pattern: Option<&str>) {
        match pattern {
            Some(p) => {
                let needle = p.to_string();
                let _ = self
                    .cache
                    .invalidate_entries_if(move |k: &String, _v: &Vec<f32>| k.contains(&needle));
            }
            None => self.cache.invalidate_all(),
        }
    }

    /// Spec §4.4 `stats()`.
    pub fn stats(&self) -> serde_json::Value {
        serde_json::json!({
            "entry_count": self.cache.entry_count(),
            "weighted_size": self.cache.weighted_size(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_format_matches_original_scheme() {
        let key = EmbeddingCache::key("minishlab/potion-base-8M", 512, "hello");
        assert!(key.starts_with("emb:minishlab_potion-base-8M:512:"));
        assert_eq!(key.split(':').count(), 4);
    }

    #[tokio::test]
    async fn round_trips_through_cache() {
        let cache = EmbeddingCache::new(100, Duration::from_secs(60));
        let key = EmbeddingCache::key("m", 512, "hello world");
        assert!(cache.get(&key).await.is_none());
        cache.insert(key.clone(), vec![1.0, 2.0, 3.0]).await;
        assert_eq!(cache.get(&key).await, Some(vec![1.0, 2.0, 3.0]));
    }
}
