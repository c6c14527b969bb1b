//! Graph-vector store (C5): data model, schema bootstrap, and the
//! `GraphStore` trait with a live Neo4j backend and an in-memory test
//! double.

pub mod graph_store;
pub mod model;
pub mod schema;

pub use graph_store::{ChunkRecord, GraphStore, MockGraphStore, Neo4rsStore, StoreHealth};
pub use model::{
    Chunk, ChunkMetadata, Document, GraphPath, IndexingResult, Intent, ResultType, SearchFacets,
    SearchResult,
};
