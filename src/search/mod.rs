//! Hybrid Search Engine and Suggestion/Facet/Walk Services (C7/C8).

pub mod engine;
pub mod facets;
pub mod rerank;
pub mod suggest;
pub mod walk;

pub use engine::{search, SearchOutcome, SearchQuery};
pub use facets::{facets, FacetsResponse};
pub use suggest::suggest;
pub use walk::walk;
