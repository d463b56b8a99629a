//! Error types for the recycling pools

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Pool is exhausted - no items available and maximum size {max_size} reached")]
    PoolExhausted { max_size: usize },

    #[error("Item is not currently borrowed from this pool")]
    InvalidRevert,

    #[error("Item was not produced by this registry")]
    UnknownItem,

    #[error("Factory returned an item the pool already tracks")]
    DuplicateItem,

    #[error("Item construction failed: {0}")]
    CreationFailed(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Metrics export failed: {0}")]
    MetricsExport(String),
}

impl PoolError {
    /// Wrap a host-side construction failure
    pub fn creation_failed(reason: impl std::fmt::Display) -> Self {
        Self::CreationFailed(reason.to_string())
    }
}

#[cfg(feature = "metrics")]
impl From<prometheus::Error> for PoolError {
    fn from(err: prometheus::Error) -> Self {
        Self::MetricsExport(err.to_string())
    }
}

pub type PoolResult<T> = Result<T, PoolError>;
