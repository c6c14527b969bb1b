pub mod app;
pub mod chunking;
pub mod config;
pub mod embedding;
pub mod error;
pub mod http;
pub mod lang;
pub mod pipeline;
pub mod search;
pub mod store;
pub mod telemetry;

pub use app::AppState;
pub use config::EngineConfig;
pub use error::{EngineError, Result};
