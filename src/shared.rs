//! Thread-safe handle around a pool registry

use crate::config::PoolConfiguration;
use crate::errors::{PoolError, PoolResult};
use crate::metrics::PoolMetrics;
use crate::registry::{EntityFactory, PoolRegistry};

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::trace;

#[cfg(feature = "metrics")]
use std::collections::HashMap;

/// Cloneable, lock-protected [`PoolRegistry`] for hosts that touch pools
/// from more than one thread or task.
///
/// Every call holds the lock for its whole duration, so each borrow or
/// revert is atomic with respect to the others.
pub struct SharedPoolRegistry<F: EntityFactory> {
    inner: Arc<Mutex<PoolRegistry<F>>>,
}

impl<F: EntityFactory> Clone for SharedPoolRegistry<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: EntityFactory> From<PoolRegistry<F>> for SharedPoolRegistry<F> {
    fn from(registry: PoolRegistry<F>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }
}

impl<F: EntityFactory> SharedPoolRegistry<F> {
    pub fn new(factory: F) -> Self {
        PoolRegistry::new(factory).into()
    }

    pub fn with_config(factory: F, config: PoolConfiguration) -> Self {
        PoolRegistry::with_config(factory, config).into()
    }

    pub fn borrow(&self, prototype: &F::Prototype) -> PoolResult<F::Entity> {
        self.inner.lock().borrow(prototype)
    }

    pub fn borrow_into(&self, prototype: &F::Prototype, parent: &F::Parent) -> PoolResult<F::Entity> {
        self.inner.lock().borrow_into(prototype, parent)
    }

    pub fn revert(&self, entity: F::Entity) -> PoolResult<()> {
        self.inner.lock().revert(entity)
    }

    pub fn revert_to(&self, prototype: &F::Prototype, entity: F::Entity) -> PoolResult<()> {
        self.inner.lock().revert_to(prototype, entity)
    }

    pub fn set_max_size(&self, prototype: &F::Prototype, max_size: usize) {
        self.inner.lock().set_max_size(prototype, max_size);
    }

    pub fn prewarm(&self, prototype: &F::Prototype, count: usize) -> PoolResult<usize> {
        self.inner.lock().prewarm(prototype, count)
    }

    pub fn size(&self, prototype: &F::Prototype) -> Option<usize> {
        self.inner.lock().pool(prototype).map(|pool| pool.size())
    }

    pub fn borrowed_count(&self, prototype: &F::Prototype) -> Option<usize> {
        self.inner.lock().pool(prototype).map(|pool| pool.borrowed_count())
    }

    pub fn max_size(&self, prototype: &F::Prototype) -> Option<usize> {
        self.inner.lock().pool(prototype).map(|pool| pool.max_size())
    }

    pub fn get_metrics(&self, prototype: &F::Prototype) -> Option<PoolMetrics> {
        self.inner.lock().get_metrics(prototype)
    }

    /// Run `f` with exclusive access to the underlying registry
    pub fn with_registry<R>(&self, f: impl FnOnce(&mut PoolRegistry<F>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Borrow an entity, waiting while the pool is exhausted.
    ///
    /// Retries every `retry_interval` until an entity is reverted or
    /// `operation_timeout` elapses. Errors other than exhaustion are
    /// returned immediately. The lock is released between attempts.
    pub async fn borrow_async(&self, prototype: &F::Prototype) -> PoolResult<F::Entity> {
        let (timeout, interval) = {
            let registry = self.inner.lock();
            (registry.config().operation_timeout, registry.config().retry_interval)
        };

        let wait = async {
            loop {
                match self.borrow(prototype) {
                    Err(PoolError::PoolExhausted { .. }) => {
                        trace!(?interval, "pool exhausted, waiting for a revert");
                        tokio::time::sleep(interval).await;
                    }
                    result => return result,
                }
            }
        };

        match timeout {
            Some(timeout) => tokio::time::timeout(timeout, wait)
                .await
                .map_err(|_| PoolError::Timeout(timeout))?,
            None => wait.await,
        }
    }
}

#[cfg(feature = "metrics")]
impl<F> SharedPoolRegistry<F>
where
    F: EntityFactory,
    F::Prototype: std::fmt::Display,
{
    pub fn export_metrics_prometheus(
        &self,
        tags: Option<&HashMap<String, String>>,
    ) -> PoolResult<String> {
        self.inner.lock().export_metrics_prometheus(tags)
    }
}
