//! Pool configuration options

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum size given to pools the registry creates on demand
pub const DEFAULT_MAX_POOL_SIZE: usize = 1000;

/// Configuration for pool behavior
///
/// # Examples
///
/// ```
/// use prefab_pool::PoolConfiguration;
/// use std::time::Duration;
///
/// let config = PoolConfiguration::new()
///     .with_max_pool_size(64)
///     .with_timeout(Duration::from_millis(500));
///
/// assert_eq!(config.max_pool_size, 64);
/// assert_eq!(config.operation_timeout, Some(Duration::from_millis(500)));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolConfiguration {
    /// Maximum number of items (available + borrowed) in a newly created pool
    pub max_pool_size: usize,

    /// Deadline for waiting borrows; `None` waits indefinitely
    pub operation_timeout: Option<Duration>,

    /// How often a waiting borrow retries an exhausted pool
    pub retry_interval: Duration,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            operation_timeout: Some(Duration::from_secs(30)),
            retry_interval: Duration::from_millis(10),
        }
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum pool size
    pub fn with_max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size;
        self
    }

    /// Set the waiting-borrow deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Wait indefinitely in waiting borrows
    pub fn without_timeout(mut self) -> Self {
        self.operation_timeout = None;
        self
    }

    /// Set the retry interval used while waiting on an exhausted pool
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }
}
