//! Health monitoring for recycling pools

#[cfg(feature = "serde")]
use serde::Serialize;

/// Utilization above which a pool is reported unhealthy
const HIGH_UTILIZATION: f64 = 0.9;

/// Health status of a recycling pool
///
/// # Examples
///
/// ```
/// use prefab_pool::RecyclingPool;
///
/// let mut pool = RecyclingPool::new(10);
/// let _item = pool.borrow_with(|| Ok("enemy-1")).unwrap();
///
/// let health = pool.get_health_status();
/// assert!(health.is_healthy());
/// assert_eq!(health.borrowed_items, 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Number of warnings detected
    pub warning_count: usize,

    /// Borrowed items relative to the maximum size (0.0 to 1.0, or above
    /// after the limit was lowered)
    pub utilization: f64,

    /// Available items count
    pub available_items: usize,

    /// Borrowed items count
    pub borrowed_items: usize,

    /// Configured maximum size
    pub max_size: usize,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    /// Create a new health status
    pub fn new(available: usize, borrowed: usize, max_size: usize) -> Self {
        let utilization = if max_size > 0 {
            borrowed as f64 / max_size as f64
        } else {
            0.0
        };
        let size = available + borrowed;

        let mut warnings = Vec::new();
        let mut is_healthy = true;

        if utilization > HIGH_UTILIZATION {
            warnings.push(format!("High utilization: {:.1}%", utilization * 100.0));
            is_healthy = false;
        }

        // The next borrow would fail
        if available == 0 && size >= max_size {
            warnings.push("Pool is exhausted".to_string());
        }

        if size > max_size {
            warnings.push(format!(
                "Pool holds {} items, above its maximum of {}",
                size, max_size
            ));
            is_healthy = false;
        }

        Self {
            is_healthy,
            warning_count: warnings.len(),
            utilization,
            available_items: available,
            borrowed_items: borrowed,
            max_size,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }
}
