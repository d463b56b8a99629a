//! Core recycling pool implementations

use crate::config::PoolConfiguration;
use crate::errors::{PoolError, PoolResult};
use crate::health::HealthStatus;
use crate::metrics::{MetricsTracker, PoolMetrics};

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;
use tracing::{debug, trace, warn};

/// Borrow/revert contract shared by the pools in this crate
pub trait ObjectPool<T> {
    /// Take an available item, or create one if the pool has room
    fn borrow(&mut self) -> PoolResult<T>;

    /// Hand a borrowed item back for reuse
    fn revert(&mut self, item: T) -> PoolResult<()>;
}

/// Bounded pool of reusable items.
///
/// Items are handles compared by equality. A handle is either waiting in the
/// available queue or tracked as borrowed, never both. Construction is
/// supplied by the caller on each borrow, so the pool has no opinion on how
/// items are built.
///
/// # Examples
///
/// ```
/// use prefab_pool::{PoolError, RecyclingPool};
///
/// let mut pool = RecyclingPool::new(1);
/// let first = pool.borrow_with(|| Ok(1u32)).unwrap();
///
/// assert_eq!(
///     pool.borrow_with(|| Ok(2u32)),
///     Err(PoolError::PoolExhausted { max_size: 1 })
/// );
///
/// pool.revert(first).unwrap();
/// assert_eq!(pool.borrow_with(|| Ok(3u32)), Ok(1));
/// ```
pub struct RecyclingPool<T> {
    available: VecDeque<T>,
    borrowed: HashSet<T>,
    max_size: usize,
    metrics: MetricsTracker,
}

impl<T: Clone + Eq + Hash> RecyclingPool<T> {
    /// Create an empty pool holding at most `max_size` items
    pub fn new(max_size: usize) -> Self {
        Self {
            available: VecDeque::new(),
            borrowed: HashSet::new(),
            max_size,
            metrics: MetricsTracker::new(),
        }
    }

    /// Create an empty pool sized from a configuration
    pub fn with_config(config: &PoolConfiguration) -> Self {
        Self::new(config.max_pool_size)
    }

    /// Borrow the oldest available item, or build a new one with `create`
    /// when nothing is available and the pool is below its maximum size.
    ///
    /// A failing `create` leaves the pool untouched.
    pub fn borrow_with<F>(&mut self, create: F) -> PoolResult<T>
    where
        F: FnOnce() -> PoolResult<T>,
    {
        if let Some(item) = self.available.pop_front() {
            self.borrowed.insert(item.clone());
            self.metrics.record_borrow();
            trace!(borrowed = self.borrowed.len(), "reused pooled item");
            return Ok(item);
        }

        if self.size() >= self.max_size {
            self.metrics.record_exhausted();
            debug!(max_size = self.max_size, "pool exhausted");
            return Err(PoolError::PoolExhausted {
                max_size: self.max_size,
            });
        }

        let item = create()?;
        if self.borrowed.contains(&item) || self.available.contains(&item) {
            return Err(PoolError::DuplicateItem);
        }

        self.borrowed.insert(item.clone());
        self.metrics.record_created();
        self.metrics.record_borrow();
        debug!(size = self.size(), max_size = self.max_size, "created pooled item");
        Ok(item)
    }

    /// Return a borrowed item to the back of the available queue.
    ///
    /// Items that are not currently borrowed are rejected with
    /// [`PoolError::InvalidRevert`] and the pool is left unchanged.
    pub fn revert(&mut self, item: T) -> PoolResult<()> {
        if !self.borrowed.remove(&item) {
            self.metrics.record_invalid_revert();
            warn!("rejected revert of an item that is not borrowed");
            return Err(PoolError::InvalidRevert);
        }

        self.available.push_back(item);
        self.metrics.record_revert();
        trace!(available = self.available.len(), "reverted pooled item");
        Ok(())
    }

    /// Create up to `count` items straight into the available queue,
    /// bounded by the room left under the maximum size.
    ///
    /// Returns how many items were created. Items created before a failing
    /// `create` call stay in the pool.
    pub fn prefill_with<F>(&mut self, count: usize, mut create: F) -> PoolResult<usize>
    where
        F: FnMut() -> PoolResult<T>,
    {
        let room = self.max_size.saturating_sub(self.size());
        let target = count.min(room);

        for created in 0..target {
            let item = match create() {
                Ok(item) => item,
                Err(err) => {
                    debug!(created, "prefill stopped by construction failure");
                    return Err(err);
                }
            };
            if self.borrowed.contains(&item) || self.available.contains(&item) {
                return Err(PoolError::DuplicateItem);
            }
            self.available.push_back(item);
            self.metrics.record_created();
        }

        Ok(target)
    }

    /// Whether `item` is currently lent out by this pool
    pub fn is_borrowed(&self, item: &T) -> bool {
        self.borrowed.contains(item)
    }
}

impl<T> RecyclingPool<T> {
    /// Total items owned by the pool (available + borrowed)
    pub fn size(&self) -> usize {
        self.available.len() + self.borrowed.len()
    }

    /// Items currently lent out
    pub fn borrowed_count(&self) -> usize {
        self.borrowed.len()
    }

    /// Items waiting in the available queue
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Change the maximum size. Existing items are never evicted; a limit
    /// below the current size only stops the pool from growing.
    pub fn set_max_size(&mut self, max_size: usize) {
        if max_size < self.size() {
            warn!(
                size = self.size(),
                max_size, "maximum size lowered below current pool size"
            );
        }
        self.max_size = max_size;
    }

    /// Get pool metrics
    pub fn get_metrics(&self) -> PoolMetrics {
        self.metrics
            .get_metrics(self.borrowed.len(), self.available.len(), self.max_size)
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.get_metrics().export()
    }

    /// Get health status
    pub fn get_health_status(&self) -> HealthStatus {
        HealthStatus::new(self.available.len(), self.borrowed.len(), self.max_size)
    }
}

impl<T> fmt::Debug for RecyclingPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecyclingPool")
            .field("available", &self.available.len())
            .field("borrowed", &self.borrowed.len())
            .field("max_size", &self.max_size)
            .finish()
    }
}

/// Recycling pool that owns its item-construction callback
pub struct DynamicObjectPool<T> {
    inner: RecyclingPool<T>,
    factory: Box<dyn FnMut() -> PoolResult<T> + Send>,
}

impl<T: Clone + Eq + Hash> DynamicObjectPool<T> {
    /// Create a new dynamic pool with factory function
    ///
    /// # Examples
    ///
    /// ```
    /// use prefab_pool::{DynamicObjectPool, ObjectPool, PoolConfiguration};
    ///
    /// let mut next = 0u32;
    /// let mut pool = DynamicObjectPool::new(
    ///     move || {
    ///         next += 1;
    ///         Ok(next)
    ///     },
    ///     PoolConfiguration::new().with_max_pool_size(2),
    /// );
    ///
    /// let a = pool.borrow().unwrap();
    /// let b = pool.borrow().unwrap();
    /// assert_ne!(a, b);
    /// assert!(pool.borrow().is_err());
    /// ```
    pub fn new<F>(factory: F, config: PoolConfiguration) -> Self
    where
        F: FnMut() -> PoolResult<T> + Send + 'static,
    {
        Self {
            inner: RecyclingPool::with_config(&config),
            factory: Box::new(factory),
        }
    }

    /// Warm up the pool by pre-creating items
    pub fn prewarm(&mut self, count: usize) -> PoolResult<usize> {
        let factory = &mut self.factory;
        self.inner.prefill_with(count, || factory())
    }

    /// Whether `item` is currently lent out by this pool
    pub fn is_borrowed(&self, item: &T) -> bool {
        self.inner.is_borrowed(item)
    }

    // Delegate methods
    pub fn size(&self) -> usize {
        self.inner.size()
    }

    pub fn borrowed_count(&self) -> usize {
        self.inner.borrowed_count()
    }

    pub fn available_count(&self) -> usize {
        self.inner.available_count()
    }

    pub fn max_size(&self) -> usize {
        self.inner.max_size()
    }

    pub fn set_max_size(&mut self, max_size: usize) {
        self.inner.set_max_size(max_size);
    }

    pub fn get_metrics(&self) -> PoolMetrics {
        self.inner.get_metrics()
    }

    pub fn get_health_status(&self) -> HealthStatus {
        self.inner.get_health_status()
    }
}

impl<T: Clone + Eq + Hash> ObjectPool<T> for DynamicObjectPool<T> {
    fn borrow(&mut self) -> PoolResult<T> {
        let factory = &mut self.factory;
        self.inner.borrow_with(|| factory())
    }

    fn revert(&mut self, item: T) -> PoolResult<()> {
        self.inner.revert(item)
    }
}
