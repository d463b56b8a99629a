//! Async usage with a shared registry

use prefab_pool::{EntityFactory, PoolConfiguration, PoolError, PoolResult, SharedPoolRegistry};
use std::time::Duration;

#[derive(Default)]
struct Spawner {
    next_id: u64,
}

impl EntityFactory for Spawner {
    type Prototype = &'static str;
    type Entity = u64;
    type Parent = ();

    fn create(&mut self, _prototype: &&'static str) -> PoolResult<u64> {
        self.next_id += 1;
        Ok(self.next_id)
    }

    fn activate(&mut self, _entity: &u64) {}

    fn deactivate(&mut self, _entity: &u64) {}
}

#[tokio::main]
async fn main() {
    println!("=== prefab_pool - Async Examples ===\n");

    // Example 1: Waiting borrow
    waiting_borrow().await;

    // Example 2: Timeout
    timeout_example().await;

    // Example 3: Concurrent tasks
    concurrent_tasks().await;
}

async fn waiting_borrow() {
    println!("1. Waiting Borrow:");
    let config = PoolConfiguration::new()
        .with_max_pool_size(1)
        .with_timeout(Duration::from_secs(1));
    let registry = SharedPoolRegistry::with_config(Spawner::default(), config);

    let held = registry.borrow(&"drone").unwrap();
    let releaser = registry.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        releaser.revert(held).unwrap();
    });

    let entity = registry.borrow_async(&"drone").await.unwrap();
    println!("   Got {} once it was reverted\n", entity);
}

async fn timeout_example() {
    println!("2. Timeout:");
    let config = PoolConfiguration::new()
        .with_max_pool_size(1)
        .with_timeout(Duration::from_millis(100));
    let registry = SharedPoolRegistry::with_config(Spawner::default(), config);

    let _held = registry.borrow(&"drone").unwrap();
    match registry.borrow_async(&"drone").await {
        Err(PoolError::Timeout(after)) => println!("   Timed out after {:?}\n", after),
        other => println!("   Unexpected: {:?}\n", other),
    }
}

async fn concurrent_tasks() {
    println!("3. Concurrent Tasks:");
    let config = PoolConfiguration::new().with_max_pool_size(4);
    let registry = SharedPoolRegistry::with_config(Spawner::default(), config);

    let mut handles = vec![];
    for i in 0..10 {
        let registry = registry.clone();
        let handle = tokio::spawn(async move {
            let entity = registry.borrow_async(&"drone").await.unwrap();
            tokio::time::sleep(Duration::from_millis(10)).await;
            registry.revert(entity).unwrap();
            println!("   Task {} used entity {}", i, entity);
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.await.unwrap();
    }

    println!("   Pool size after all tasks: {:?}", registry.size(&"drone"));
}
