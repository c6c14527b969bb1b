//! Embedding (C4): a lazily-loaded Model2Vec vectorizer plus a TTL
//! cache in front of it.

pub mod cache;
pub mod vectorizer;

pub use cache::EmbeddingCache;
pub use vectorizer::Vectorizer;
