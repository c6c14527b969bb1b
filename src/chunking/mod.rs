//! Chunking (C3): language-aware, overlap-injecting document chunking,
//! plus file-format extraction feeding it.

pub mod chunker;
pub mod extract;

pub use chunker::{Chunker, ChunkerConfig};
