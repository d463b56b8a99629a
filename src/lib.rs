//! # prefab_pool
//!
//! Bounded recycling pools for game engine entities, keyed by the prototype
//! ("prefab") the entities are instantiated from.
//!
//! ## Features
//!
//! - FIFO reuse of returned items with a per-pool size cap
//! - Explicit `PoolExhausted` errors instead of silent growth
//! - Rejection of reverts for items that are not borrowed
//! - Per-prototype pools created on demand, with entities remembering
//!   their source prototype
//! - Host lifecycle hooks (create, activate, deactivate, park) behind the
//!   `EntityFactory` trait
//! - Pool warm-up/pre-population
//! - Lock-protected shared registry with an async waiting borrow
//! - Health monitoring, metrics and Prometheus export
//!
//! ## Quick Start
//!
//! ```rust
//! use prefab_pool::{DynamicObjectPool, ObjectPool, PoolConfiguration};
//!
//! let mut next = 0u32;
//! let mut pool = DynamicObjectPool::new(
//!     move || {
//!         next += 1;
//!         Ok(next)
//!     },
//!     PoolConfiguration::new().with_max_pool_size(8),
//! );
//!
//! let item = pool.borrow().unwrap();
//! pool.revert(item).unwrap();
//! assert_eq!(pool.borrow().unwrap(), item);
//! ```

mod pool;
mod registry;
mod shared;
mod config;
mod metrics;
mod health;
mod errors;

pub use pool::{ObjectPool, RecyclingPool, DynamicObjectPool};
pub use registry::{EntityFactory, PoolRegistry};
pub use shared::SharedPoolRegistry;
pub use config::{PoolConfiguration, DEFAULT_MAX_POOL_SIZE};
pub use metrics::{PoolMetrics, MetricsExporter};
pub use health::HealthStatus;
pub use errors::{PoolError, PoolResult};
