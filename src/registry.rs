//! Prototype-keyed registry of recycling pools

use crate::config::PoolConfiguration;
use crate::errors::{PoolError, PoolResult};
use crate::health::HealthStatus;
use crate::metrics::PoolMetrics;
use crate::pool::RecyclingPool;

use std::collections::HashMap;
use std::hash::Hash;
use tracing::{debug, warn};

#[cfg(feature = "metrics")]
use crate::metrics::MetricsExporter;

/// Host-side collaborator that builds entities from prototypes and drives
/// their lifecycle in the scene.
///
/// The registry never inspects entities; it only calls these hooks.
pub trait EntityFactory {
    /// Template identity an entity is instantiated from
    type Prototype: Clone + Eq + Hash;

    /// Handle to a live entity
    type Entity: Clone + Eq + Hash;

    /// Scene node a borrowed entity can be attached under
    type Parent;

    /// Instantiate a new entity from `prototype`
    fn create(&mut self, prototype: &Self::Prototype) -> PoolResult<Self::Entity>;

    /// Make a borrowed entity live in the scene
    fn activate(&mut self, entity: &Self::Entity);

    /// Take a returned entity out of play
    fn deactivate(&mut self, entity: &Self::Entity);

    /// Move a returned entity into the host's holding area
    fn park(&mut self, _entity: &Self::Entity) {}

    /// Attach a borrowed entity under `parent`
    fn attach(&mut self, _entity: &Self::Entity, _parent: &Self::Parent) {}
}

/// One recycling pool per prototype, created on first use.
///
/// Entities remember the prototype they were built from, so they can be
/// reverted without naming it again.
///
/// # Examples
///
/// ```
/// use prefab_pool::{EntityFactory, PoolRegistry, PoolResult};
/// use std::collections::HashSet;
///
/// #[derive(Default)]
/// struct Scene {
///     next_id: u32,
///     live: HashSet<u32>,
/// }
///
/// impl EntityFactory for Scene {
///     type Prototype = &'static str;
///     type Entity = u32;
///     type Parent = ();
///
///     fn create(&mut self, _prototype: &&'static str) -> PoolResult<u32> {
///         self.next_id += 1;
///         Ok(self.next_id)
///     }
///
///     fn activate(&mut self, entity: &u32) {
///         self.live.insert(*entity);
///     }
///
///     fn deactivate(&mut self, entity: &u32) {
///         self.live.remove(entity);
///     }
/// }
///
/// let mut registry = PoolRegistry::new(Scene::default());
/// let bullet = registry.borrow(&"bullet").unwrap();
/// assert!(registry.factory().live.contains(&bullet));
///
/// registry.revert(bullet).unwrap();
/// assert!(registry.factory().live.is_empty());
/// assert_eq!(registry.borrow(&"bullet").unwrap(), bullet);
/// ```
pub struct PoolRegistry<F: EntityFactory> {
    factory: F,
    pools: HashMap<F::Prototype, RecyclingPool<F::Entity>>,
    sources: HashMap<F::Entity, F::Prototype>,
    config: PoolConfiguration,
}

impl<F: EntityFactory> PoolRegistry<F> {
    /// Create a registry with the default configuration
    pub fn new(factory: F) -> Self {
        Self::with_config(factory, PoolConfiguration::default())
    }

    pub fn with_config(factory: F, config: PoolConfiguration) -> Self {
        Self {
            factory,
            pools: HashMap::new(),
            sources: HashMap::new(),
            config,
        }
    }

    /// Borrow an entity of `prototype`, reusing a parked one when possible.
    ///
    /// The entity is activated before it is returned. Nothing is activated
    /// when the pool is exhausted or construction fails. A newly built
    /// entity that any pool of this registry already tracks is rejected
    /// with [`PoolError::DuplicateItem`].
    pub fn borrow(&mut self, prototype: &F::Prototype) -> PoolResult<F::Entity> {
        let factory = &mut self.factory;
        let sources = &mut self.sources;
        let pool = Self::pool_entry(&mut self.pools, &self.config, prototype);

        let entity = pool.borrow_with(|| {
            let entity = factory.create(prototype)?;
            if sources.contains_key(&entity) {
                warn!("factory returned an entity that is already pooled");
                return Err(PoolError::DuplicateItem);
            }
            // Untagged entities are in no pool, so the pool accepts this one
            sources.insert(entity.clone(), prototype.clone());
            Ok(entity)
        })?;

        self.factory.activate(&entity);
        Ok(entity)
    }

    /// Borrow an entity of `prototype` and attach it under `parent`
    pub fn borrow_into(
        &mut self,
        prototype: &F::Prototype,
        parent: &F::Parent,
    ) -> PoolResult<F::Entity> {
        let entity = self.borrow(prototype)?;
        self.factory.attach(&entity, parent);
        Ok(entity)
    }

    /// Return a borrowed entity to the pool of its source prototype.
    ///
    /// Fails with [`PoolError::UnknownItem`] for entities this registry never
    /// produced and [`PoolError::InvalidRevert`] for entities that are not
    /// currently borrowed. Host hooks run only for accepted reverts.
    pub fn revert(&mut self, entity: F::Entity) -> PoolResult<()> {
        let Some(prototype) = self.sources.get(&entity) else {
            warn!("rejected revert of an entity with no source prototype");
            return Err(PoolError::UnknownItem);
        };
        let Some(pool) = self.pools.get_mut(prototype) else {
            return Err(PoolError::UnknownItem);
        };

        if !pool.is_borrowed(&entity) {
            // Lets the pool count and report the rejection
            return pool.revert(entity);
        }

        self.factory.park(&entity);
        self.factory.deactivate(&entity);
        pool.revert(entity)
    }

    /// Return a borrowed entity to the pool of `prototype`.
    ///
    /// Fails with [`PoolError::InvalidRevert`] when the entity was built from
    /// a different prototype, otherwise behaves like [`Self::revert`].
    pub fn revert_to(&mut self, prototype: &F::Prototype, entity: F::Entity) -> PoolResult<()> {
        let from_prototype = match self.sources.get(&entity) {
            Some(source) => source == prototype,
            None => {
                warn!("rejected revert of an entity with no source prototype");
                return Err(PoolError::UnknownItem);
            }
        };
        if !from_prototype {
            warn!("rejected revert to a pool the entity did not come from");
            return Err(PoolError::InvalidRevert);
        }
        self.revert(entity)
    }

    /// Set the maximum size of the pool for `prototype`, creating the pool
    /// if it does not exist yet
    pub fn set_max_size(&mut self, prototype: &F::Prototype, max_size: usize) {
        Self::pool_entry(&mut self.pools, &self.config, prototype).set_max_size(max_size);
    }

    /// Pre-create up to `count` parked entities for `prototype`.
    ///
    /// Returns how many were created. An entity already tracked by any pool
    /// stops the warm-up with [`PoolError::DuplicateItem`]; its tag and host
    /// state are left as they were.
    pub fn prewarm(&mut self, prototype: &F::Prototype, count: usize) -> PoolResult<usize> {
        let factory = &mut self.factory;
        let sources = &mut self.sources;
        let pool = Self::pool_entry(&mut self.pools, &self.config, prototype);

        pool.prefill_with(count, || {
            let entity = factory.create(prototype)?;
            if sources.contains_key(&entity) {
                warn!("factory returned an entity that is already pooled");
                return Err(PoolError::DuplicateItem);
            }
            sources.insert(entity.clone(), prototype.clone());
            factory.park(&entity);
            factory.deactivate(&entity);
            Ok(entity)
        })
    }

    /// Pool for `prototype`, if one has been created
    pub fn pool(&self, prototype: &F::Prototype) -> Option<&RecyclingPool<F::Entity>> {
        self.pools.get(prototype)
    }

    /// Prototype `entity` was built from
    pub fn source_of(&self, entity: &F::Entity) -> Option<&F::Prototype> {
        self.sources.get(entity)
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Prototypes that currently have a pool
    pub fn prototypes(&self) -> impl Iterator<Item = &F::Prototype> {
        self.pools.keys()
    }

    pub fn config(&self) -> &PoolConfiguration {
        &self.config
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    /// Get metrics for the pool of `prototype`
    pub fn get_metrics(&self, prototype: &F::Prototype) -> Option<PoolMetrics> {
        self.pools.get(prototype).map(RecyclingPool::get_metrics)
    }

    /// Get health status for the pool of `prototype`
    pub fn get_health_status(&self, prototype: &F::Prototype) -> Option<HealthStatus> {
        self.pools.get(prototype).map(RecyclingPool::get_health_status)
    }

    fn pool_entry<'a>(
        pools: &'a mut HashMap<F::Prototype, RecyclingPool<F::Entity>>,
        config: &PoolConfiguration,
        prototype: &F::Prototype,
    ) -> &'a mut RecyclingPool<F::Entity> {
        pools.entry(prototype.clone()).or_insert_with(|| {
            debug!(max_size = config.max_pool_size, "creating pool for prototype");
            RecyclingPool::with_config(config)
        })
    }
}

#[cfg(feature = "metrics")]
impl<F> PoolRegistry<F>
where
    F: EntityFactory,
    F::Prototype: std::fmt::Display,
{
    /// Export metrics of every pool in Prometheus format, labelled by
    /// prototype
    pub fn export_metrics_prometheus(
        &self,
        tags: Option<&HashMap<String, String>>,
    ) -> PoolResult<String> {
        let mut pools: Vec<(String, PoolMetrics)> = self
            .pools
            .iter()
            .map(|(prototype, pool)| (prototype.to_string(), pool.get_metrics()))
            .collect();
        pools.sort_by(|a, b| a.0.cmp(&b.0));
        MetricsExporter::export_prometheus(&pools, tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct EntityId(u32);

    #[derive(Default)]
    struct MockScene {
        next_id: u32,
        active: HashSet<EntityId>,
        parked: Vec<EntityId>,
        created: Vec<&'static str>,
        broken: HashSet<&'static str>,
        attached: Vec<(EntityId, &'static str)>,
        // Hands out the same handle on every create
        fixed_id: Option<u32>,
    }

    impl EntityFactory for MockScene {
        type Prototype = &'static str;
        type Entity = EntityId;
        type Parent = &'static str;

        fn create(&mut self, prototype: &&'static str) -> PoolResult<EntityId> {
            if self.broken.contains(prototype) {
                return Err(PoolError::creation_failed(format!("missing prefab {prototype}")));
            }
            self.created.push(*prototype);
            if let Some(id) = self.fixed_id {
                return Ok(EntityId(id));
            }
            self.next_id += 1;
            Ok(EntityId(self.next_id))
        }

        fn activate(&mut self, entity: &EntityId) {
            self.active.insert(*entity);
        }

        fn deactivate(&mut self, entity: &EntityId) {
            self.active.remove(entity);
        }

        fn park(&mut self, entity: &EntityId) {
            self.parked.push(*entity);
        }

        fn attach(&mut self, entity: &EntityId, parent: &&'static str) {
            self.attached.push((*entity, *parent));
        }
    }

    fn fixed_id_scene() -> MockScene {
        MockScene {
            fixed_id: Some(1),
            ..MockScene::default()
        }
    }

    #[test]
    fn test_lazy_pool_creation_with_default_size() {
        let mut registry = PoolRegistry::new(MockScene::default());
        assert_eq!(registry.pool_count(), 0);

        registry.borrow(&"enemy").unwrap();

        let pool = registry.pool(&"enemy").unwrap();
        assert_eq!(pool.max_size(), crate::config::DEFAULT_MAX_POOL_SIZE);
        assert_eq!(pool.borrowed_count(), 1);
        assert_eq!(registry.pool_count(), 1);
    }

    #[test]
    fn test_borrow_activates_and_revert_parks() {
        let mut registry = PoolRegistry::new(MockScene::default());
        let entity = registry.borrow(&"bullet").unwrap();
        assert!(registry.factory().active.contains(&entity));

        registry.revert(entity).unwrap();
        assert!(registry.factory().active.is_empty());
        assert_eq!(registry.factory().parked, vec![entity]);
    }

    #[test]
    fn test_revert_routes_by_source_prototype() {
        let mut registry = PoolRegistry::new(MockScene::default());
        let bullet = registry.borrow(&"bullet").unwrap();
        let spark = registry.borrow(&"spark").unwrap();

        assert_eq!(registry.source_of(&bullet), Some(&"bullet"));
        registry.revert(spark).unwrap();

        assert_eq!(registry.pool(&"spark").unwrap().available_count(), 1);
        assert_eq!(registry.pool(&"bullet").unwrap().available_count(), 0);
        assert_eq!(registry.borrow(&"spark").unwrap(), spark);
        assert_ne!(registry.borrow(&"bullet").unwrap(), spark);
    }

    #[test]
    fn test_scenario_with_max_size_two() {
        let mut registry = PoolRegistry::new(MockScene::default());
        registry.set_max_size(&"crate", 2);

        let item1 = registry.borrow(&"crate").unwrap();
        let item2 = registry.borrow(&"crate").unwrap();
        assert_ne!(item1, item2);
        assert_eq!(
            registry.borrow(&"crate"),
            Err(PoolError::PoolExhausted { max_size: 2 })
        );

        registry.revert(item1).unwrap();
        assert_eq!(registry.borrow(&"crate").unwrap(), item1);
        assert_eq!(registry.factory().created.len(), 2);
    }

    #[test]
    fn test_limits_are_per_prototype() {
        let mut registry = PoolRegistry::new(MockScene::default());
        registry.set_max_size(&"boss", 1);

        registry.borrow(&"boss").unwrap();
        assert!(registry.borrow(&"boss").is_err());
        assert!(registry.borrow(&"minion").is_ok());
    }

    #[test]
    fn test_invalid_revert_skips_host_hooks() {
        let mut registry = PoolRegistry::new(MockScene::default());
        let entity = registry.borrow(&"bullet").unwrap();
        registry.revert(entity).unwrap();

        assert_eq!(registry.revert(entity), Err(PoolError::InvalidRevert));
        assert_eq!(registry.factory().parked.len(), 1);
        assert_eq!(registry.pool(&"bullet").unwrap().available_count(), 1);
        assert_eq!(registry.get_metrics(&"bullet").unwrap().invalid_reverts, 1);
    }

    #[test]
    fn test_unknown_entity_is_rejected() {
        let mut registry = PoolRegistry::new(MockScene::default());
        registry.borrow(&"bullet").unwrap();

        assert_eq!(registry.revert(EntityId(404)), Err(PoolError::UnknownItem));
        assert!(registry.factory().parked.is_empty());
    }

    #[test]
    fn test_creation_failure_propagates() {
        let mut scene = MockScene::default();
        scene.broken.insert("ghost");
        let mut registry = PoolRegistry::new(scene);

        assert!(matches!(
            registry.borrow(&"ghost"),
            Err(PoolError::CreationFailed(_))
        ));
        assert!(registry.factory().active.is_empty());
        assert_eq!(registry.pool(&"ghost").unwrap().size(), 0);
    }

    #[test]
    fn test_prewarm_parks_tagged_entities() {
        let config = PoolConfiguration::new().with_max_pool_size(3);
        let mut registry = PoolRegistry::with_config(MockScene::default(), config);

        assert_eq!(registry.prewarm(&"coin", 5), Ok(3));
        assert_eq!(registry.factory().parked.len(), 3);
        assert!(registry.factory().active.is_empty());

        let coin = registry.borrow(&"coin").unwrap();
        assert_eq!(registry.source_of(&coin), Some(&"coin"));
        assert_eq!(registry.factory().created.len(), 3);
    }

    #[test]
    fn test_same_handle_for_two_prototypes_is_rejected() {
        let mut registry = PoolRegistry::new(fixed_id_scene());
        let first = registry.borrow(&"a").unwrap();

        assert_eq!(registry.borrow(&"b"), Err(PoolError::DuplicateItem));
        assert_eq!(registry.pool(&"b").unwrap().size(), 0);
        assert_eq!(registry.source_of(&first), Some(&"a"));
        assert_eq!(registry.factory().active.len(), 1);

        registry.revert(first).unwrap();
        assert_eq!(registry.pool(&"a").unwrap().available_count(), 1);
        assert_eq!(registry.pool(&"b").unwrap().borrowed_count(), 0);
    }

    #[test]
    fn test_prewarm_duplicate_leaves_tag_and_hooks_alone() {
        let mut registry = PoolRegistry::new(fixed_id_scene());
        let first = registry.borrow(&"a").unwrap();

        assert_eq!(registry.prewarm(&"b", 2), Err(PoolError::DuplicateItem));
        assert_eq!(registry.source_of(&first), Some(&"a"));
        assert!(registry.factory().parked.is_empty());
        assert!(registry.factory().active.contains(&first));
        assert_eq!(registry.pool(&"b").unwrap().size(), 0);
        assert_eq!(registry.get_metrics(&"b").unwrap().total_created, 0);
    }

    #[test]
    fn test_borrow_into_attaches_after_activation() {
        let mut registry = PoolRegistry::new(MockScene::default());
        let entity = registry.borrow_into(&"bullet", &"turret").unwrap();

        assert!(registry.factory().active.contains(&entity));
        assert_eq!(registry.factory().attached, vec![(entity, "turret")]);
    }

    #[test]
    fn test_borrow_into_exhausted_attaches_nothing() {
        let mut registry = PoolRegistry::new(MockScene::default());
        registry.set_max_size(&"bullet", 0);

        assert!(registry.borrow_into(&"bullet", &"turret").is_err());
        assert!(registry.factory().attached.is_empty());
    }

    #[test]
    fn test_revert_to_checks_source_prototype() {
        let mut registry = PoolRegistry::new(MockScene::default());
        let bullet = registry.borrow(&"bullet").unwrap();

        assert_eq!(registry.revert_to(&"spark", bullet), Err(PoolError::InvalidRevert));
        assert!(registry.factory().parked.is_empty());
        assert_eq!(registry.revert_to(&"bullet", EntityId(404)), Err(PoolError::UnknownItem));

        registry.revert_to(&"bullet", bullet).unwrap();
        assert_eq!(registry.pool(&"bullet").unwrap().available_count(), 1);
    }

    #[test]
    fn test_health_follows_pool_state() {
        let mut registry = PoolRegistry::new(MockScene::default());
        registry.set_max_size(&"boss", 1);
        assert!(registry.get_health_status(&"boss").unwrap().is_healthy());

        registry.borrow(&"boss").unwrap();
        assert!(!registry.get_health_status(&"boss").unwrap().is_healthy());
        assert!(registry.get_health_status(&"missing").is_none());
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_prometheus_export_per_prototype() {
        let mut registry = PoolRegistry::new(MockScene::default());
        registry.borrow(&"bullet").unwrap();
        registry.borrow(&"spark").unwrap();

        let output = registry.export_metrics_prometheus(None).unwrap();
        assert!(output.contains("prefab_pool_items_created_total"));
        assert!(output.contains("pool=\"bullet\""));
        assert!(output.contains("pool=\"spark\""));
    }
}
