//! Indexing Pipeline (C6): compose the chunker, vectorizer, and store to
//! index a document end-to-end atomically.

pub mod indexing;

pub use indexing::{index_document, ErrorCategory, IndexingRequest};
