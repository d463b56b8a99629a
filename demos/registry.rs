//! Prototype-keyed registry driving a host scene

use prefab_pool::{EntityFactory, PoolRegistry, PoolResult};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Prefab {
    Asteroid,
    Bullet,
}

impl std::fmt::Display for Prefab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prefab::Asteroid => write!(f, "asteroid"),
            Prefab::Bullet => write!(f, "bullet"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EntityId(u32);

/// Toy scene graph: live entities and a holding area for parked ones
#[derive(Default)]
struct Scene {
    next_id: u32,
    live: HashSet<EntityId>,
    holding_area: HashSet<EntityId>,
}

impl EntityFactory for Scene {
    type Prototype = Prefab;
    type Entity = EntityId;
    type Parent = EntityId;

    fn create(&mut self, prototype: &Prefab) -> PoolResult<EntityId> {
        self.next_id += 1;
        println!("   [scene] instantiate {} as {:?}", prototype, EntityId(self.next_id));
        Ok(EntityId(self.next_id))
    }

    fn activate(&mut self, entity: &EntityId) {
        self.holding_area.remove(entity);
        self.live.insert(*entity);
    }

    fn deactivate(&mut self, entity: &EntityId) {
        self.live.remove(entity);
    }

    fn park(&mut self, entity: &EntityId) {
        self.holding_area.insert(*entity);
    }

    fn attach(&mut self, entity: &EntityId, parent: &EntityId) {
        println!("   [scene] attach {:?} under {:?}", entity, parent);
    }
}

fn main() {
    println!("=== prefab_pool - Registry ===\n");

    let mut registry = PoolRegistry::new(Scene::default());
    registry.set_max_size(&Prefab::Bullet, 3);

    println!("1. Prewarm asteroids:");
    let created = registry.prewarm(&Prefab::Asteroid, 2).unwrap();
    println!("   Created {} parked asteroids\n", created);

    println!("2. Fire bullets until the pool is exhausted:");
    let mut bullets = Vec::new();
    loop {
        match registry.borrow(&Prefab::Bullet) {
            Ok(bullet) => bullets.push(bullet),
            Err(err) => {
                println!("   Stopped: {}", err);
                break;
            }
        }
    }
    println!("   Live entities: {}\n", registry.factory().live.len());

    println!("3. Revert without naming the prefab:");
    for bullet in bullets.drain(..) {
        let source = registry.source_of(&bullet).copied();
        registry.revert(bullet).unwrap();
        println!("   {:?} back to the {:?} pool", bullet, source);
    }
    println!("   Holding area: {}\n", registry.factory().holding_area.len());

    println!("4. Borrow under a parent, revert by prefab:");
    let ship = registry.borrow(&Prefab::Asteroid).unwrap();
    let bullet = registry.borrow_into(&Prefab::Bullet, &ship).unwrap();
    match registry.revert_to(&Prefab::Asteroid, bullet) {
        Err(err) => println!("   Wrong prefab: {}", err),
        Ok(()) => println!("   Wrong prefab accepted"),
    }
    registry.revert_to(&Prefab::Bullet, bullet).unwrap();
    registry.revert(ship).unwrap();
    println!();

    println!("5. Prometheus export:");
    let mut tags = HashMap::new();
    tags.insert("scene".to_string(), "demo".to_string());
    println!("{}", registry.export_metrics_prometheus(Some(&tags)).unwrap());
}
