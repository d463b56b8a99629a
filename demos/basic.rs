//! Basic usage examples for the recycling pools

use prefab_pool::{
    DynamicObjectPool, ObjectPool, PoolConfiguration, PoolError, RecyclingPool,
};

fn main() {
    println!("=== prefab_pool - Basic Examples ===\n");

    // Example 1: Pool with an owned factory
    dynamic_pool();

    // Example 2: Exhaustion and reuse
    exhaustion();

    // Example 3: Rejected reverts
    invalid_revert();

    // Example 4: Metrics and health
    metrics_and_health();
}

fn counting_pool(max_size: usize) -> DynamicObjectPool<u32> {
    let mut next = 0;
    DynamicObjectPool::new(
        move || {
            next += 1;
            Ok(next)
        },
        PoolConfiguration::new().with_max_pool_size(max_size),
    )
}

fn dynamic_pool() {
    println!("1. Dynamic Pool:");
    let mut pool = counting_pool(10);

    let item = pool.borrow().unwrap();
    println!("   Got item: {}", item);
    pool.revert(item).unwrap();

    println!("   Available after revert: {}", pool.available_count());
    println!("   Borrowed again: {}\n", pool.borrow().unwrap());
}

fn exhaustion() {
    println!("2. Exhaustion:");
    let mut pool = counting_pool(2);

    let first = pool.borrow().unwrap();
    let _second = pool.borrow().unwrap();

    match pool.borrow() {
        Err(PoolError::PoolExhausted { max_size }) => {
            println!("   Third borrow: exhausted (max {})", max_size)
        }
        other => println!("   Third borrow: {:?}", other),
    }

    pool.revert(first).unwrap();
    println!("   After revert: got {}\n", pool.borrow().unwrap());
}

fn invalid_revert() {
    println!("3. Rejected Reverts:");
    let mut pool = RecyclingPool::new(4);
    let item = pool.borrow_with(|| Ok("spark")).unwrap();

    pool.revert(item).unwrap();
    match pool.revert(item) {
        Err(err) => println!("   Second revert: {}", err),
        Ok(()) => println!("   Second revert accepted"),
    }
    println!("   Available: {}\n", pool.available_count());
}

fn metrics_and_health() {
    println!("4. Metrics and Health:");
    let mut pool = counting_pool(5);
    pool.prewarm(3).unwrap();

    let _a = pool.borrow().unwrap();
    let _b = pool.borrow().unwrap();

    let health = pool.get_health_status();
    println!("   Health: {}", if health.is_healthy { "Healthy" } else { "Unhealthy" });
    println!("   Utilization: {:.1}%", health.utilization * 100.0);
    println!("   Borrowed: {}, Available: {}", health.borrowed_items, health.available_items);

    let metrics = pool.get_metrics();
    println!("\n   Metrics:");
    for (key, value) in metrics.export() {
        println!("     {}: {}", key, value);
    }
}
