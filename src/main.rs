// prefab_pool demo binary
// The library lives in lib.rs; more usage in demos/ (cargo run --example basic)

use prefab_pool::{EntityFactory, PoolError, PoolRegistry, PoolResult};
use std::collections::HashSet;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Minimal stand-in for an engine scene
#[derive(Default)]
struct Arena {
    next_id: u64,
    live: HashSet<u64>,
}

impl EntityFactory for Arena {
    type Prototype = String;
    type Entity = u64;
    type Parent = ();

    fn create(&mut self, prototype: &String) -> PoolResult<u64> {
        self.next_id += 1;
        info!("  instantiated {} #{}", prototype, self.next_id);
        Ok(self.next_id)
    }

    fn activate(&mut self, entity: &u64) {
        self.live.insert(*entity);
    }

    fn deactivate(&mut self, entity: &u64) {
        self.live.remove(entity);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_level = match std::env::var("PREFAB_POOL_LOG").as_deref() {
        Ok("trace") => Level::TRACE,
        Ok("debug") => Level::DEBUG,
        Ok("warn") => Level::WARN,
        Ok("error") => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("prefab_pool v{}", env!("CARGO_PKG_VERSION"));

    let mut registry = PoolRegistry::new(Arena::default());
    let bullet = "bullet".to_string();
    registry.set_max_size(&bullet, 2);

    let first = registry.borrow(&bullet)?;
    let second = registry.borrow(&bullet)?;
    info!("Borrowed #{} and #{}, live: {}", first, second, registry.factory().live.len());

    match registry.borrow(&bullet) {
        Err(PoolError::PoolExhausted { max_size }) => {
            warn!("Third borrow refused, pool capped at {}", max_size)
        }
        other => info!("Unexpected third borrow: {:?}", other),
    }

    registry.revert(first)?;
    let reused = registry.borrow(&bullet)?;
    info!("Reused #{} after revert", reused);

    if let Some(pool) = registry.pool(&bullet) {
        info!(
            "Pool size {} (borrowed {}, max {})",
            pool.size(),
            pool.borrowed_count(),
            pool.max_size()
        );
    }

    Ok(())
}
