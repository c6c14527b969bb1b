use thiserror::Error;

/// The crate's single error type. Every fallible public operation
/// resolves to one of these variants; internal plumbing may still use
/// `anyhow::Result` and convert via `.map_err(EngineError::from)` or
/// `EngineError::internal(...)` at the boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("dependency failure ({kind}): {message}")]
    Dependency {
        kind: DependencyKind,
        message: String,
    },

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("operation cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Which downstream dependency failed, for metrics/log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Vectorizer,
    Store,
    Cache,
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DependencyKind::Vectorizer => "vectorizer",
            DependencyKind::Store => "store",
            DependencyKind::Cache => "cache",
        };
        f.write_str(s)
    }
}

impl EngineError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        EngineError::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        EngineError::NotFound(msg.into())
    }

    pub fn dependency(kind: DependencyKind, msg: impl Into<String>) -> Self {
        EngineError::Dependency {
            kind,
            message: msg.into(),
        }
    }

    /// True for failures worth a bounded retry (transient store/cache
    /// errors); false for input errors and cancellation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::Dependency {
                kind: DependencyKind::Store,
                ..
            } | EngineError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
