//! Registry of entity collections

use super::Context;
use super::context::Command;
use crate::math::Hit;
use crate::world::{Callback, CollectionId, Entity, EntityCollection, EntityRef, ProxyView};

/// Every registered collection, in registration order
#[derive(Debug, Default)]
pub struct Collections {
    collections: Vec<EntityCollection>,
    next_id: u32,
}

impl Collections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, empty collection
    pub fn create(&mut self, name: impl Into<String>) -> CollectionId {
        let id = CollectionId(self.next_id);
        self.next_id += 1;
        let collection = EntityCollection::new(id, name);
        log::info!("Created entity collection '{}' ({})", collection.name(), id);
        self.collections.push(collection);
        id
    }

    /// Unregister a collection, cleaning up everything it still holds
    pub fn destroy(&mut self, id: CollectionId, ctx: &mut Context) -> bool {
        let Some(index) = self.collections.iter().position(|c| c.id() == id) else {
            log::warn!("No collection {} to destroy", id);
            return false;
        };
        let mut collection = self.collections.remove(index);
        collection.destroy(ctx);
        log::info!("Destroyed entity collection '{}' ({})", collection.name(), id);
        true
    }

    pub(crate) fn destroy_all(&mut self, ctx: &mut Context) {
        while let Some(mut collection) = self.collections.pop() {
            collection.destroy(ctx);
            log::debug!("Destroyed entity collection '{}'", collection.name());
        }
    }

    pub fn get(&self, id: CollectionId) -> Option<&EntityCollection> {
        self.collections.iter().find(|c| c.id() == id)
    }

    pub fn get_mut(&mut self, id: CollectionId) -> Option<&mut EntityCollection> {
        self.collections.iter_mut().find(|c| c.id() == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<CollectionId> {
        self.collections.iter().find(|c| c.name() == name).map(|c| c.id())
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityCollection> {
        self.collections.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EntityCollection> {
        self.collections.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    // === Entities ===

    pub fn entity(&self, target: EntityRef) -> Option<&Entity> {
        self.get(target.collection)?.get(target.entity)
    }

    /// Raw access without a cache sync; only for fields the caches ignore
    pub(crate) fn entity_mut(&mut self, target: EntityRef) -> Option<&mut Entity> {
        self.get_mut(target.collection)?.get_mut(target.entity)
    }

    pub fn with_entity_mut<R>(&mut self, target: EntityRef, f: impl FnOnce(&mut Entity) -> R) -> Option<R> {
        self.get_mut(target.collection)?.with_entity_mut(target.entity, f)
    }

    pub fn add(&mut self, collection: CollectionId, entity: Entity, ctx: &mut Context) -> Option<EntityRef> {
        let Some(target) = self.get_mut(collection) else {
            log::error!("Can't add '{}' to unknown {}", entity.name, collection);
            return None;
        };
        let id = target.add(entity, ctx);
        Some(EntityRef::new(collection, id))
    }

    pub fn remove(&mut self, target: EntityRef, ctx: &mut Context) -> bool {
        self.get_mut(target.collection)
            .is_some_and(|collection| collection.remove(target.entity, ctx))
    }

    pub fn clear(&mut self, collection: CollectionId, ctx: &mut Context) {
        if let Some(collection) = self.get_mut(collection) {
            collection.clear(ctx);
        }
    }

    pub fn set_active(&mut self, target: EntityRef, value: bool, ctx: &mut Context) -> bool {
        self.get_mut(target.collection)
            .is_some_and(|collection| collection.set_active(target.entity, value, ctx))
    }

    /// First entity, across all collections, with the given name
    pub fn find_entity_by_name(&self, name: &str) -> Option<EntityRef> {
        self.collections.iter().find_map(|collection| {
            collection
                .find_by_name(name)
                .map(|id| EntityRef::new(collection.id(), id))
        })
    }

    /// First entity, across all collections, matching `predicate`
    pub fn find_entity(&self, mut predicate: impl FnMut(&Entity) -> bool) -> Option<EntityRef> {
        self.all_entities()
            .iter()
            .find(|target| self.entity(*target).is_some_and(&mut predicate))
    }

    // === Aggregate views ===

    pub fn all_entities(&self) -> ProxyView<'_> {
        self.view(EntityCollection::entities)
    }

    pub fn all_active_entities(&self) -> ProxyView<'_> {
        self.view(EntityCollection::active_entities)
    }

    pub fn all_inactive_entities(&self) -> ProxyView<'_> {
        self.view(EntityCollection::inactive_entities)
    }

    pub fn all_static_bodies(&self) -> ProxyView<'_> {
        self.view(EntityCollection::static_bodies)
    }

    pub fn all_rigid_bodies(&self) -> ProxyView<'_> {
        self.view(EntityCollection::rigid_bodies)
    }

    fn view<'a>(&'a self, part: fn(&'a EntityCollection) -> &'a [crate::world::EntityId]) -> ProxyView<'a> {
        let mut view = ProxyView::new();
        for collection in &self.collections {
            view.push(collection.id(), part(collection));
        }
        view
    }

    // === Dispatch ===

    /// Apply queued removals, then queued additions, in every collection
    pub(crate) fn process_queues(&mut self, ctx: &mut Context) {
        for collection in &mut self.collections {
            collection.process_remove_queue(ctx);
            collection.process_add_queue();
        }
        self.apply_commands(ctx);
    }

    /// Run a stage callback on every usable active entity.
    ///
    /// Targets are snapshotted first; entities added during the pass wait for
    /// the next one.
    pub(crate) fn dispatch(&mut self, callback: Callback, ctx: &mut Context) {
        let targets = self.all_active_entities().to_vec();
        for target in targets {
            let Some(collection) = self.get_mut(target.collection) else {
                continue;
            };
            let Some(entity) = collection.get_mut(target.entity) else {
                continue;
            };
            if !entity.can_be_used() {
                continue;
            }
            entity.dispatch(callback, ctx);
            collection.sync_entity(target.entity);
            self.apply_commands(ctx);
        }
    }

    /// Report a contact to one entity
    pub(crate) fn notify_hit(&mut self, target: EntityRef, hit: &Hit, ctx: &mut Context) {
        if let Some(collection) = self.get_mut(target.collection) {
            if let Some(entity) = collection.get_mut(target.entity) {
                entity.on_hit(hit, ctx);
            }
            collection.sync_entity(target.entity);
        }
        self.apply_commands(ctx);
    }

    /// Copy every usable active entity's position into `last_pos`
    pub(crate) fn record_last_positions(&mut self) {
        for collection in &mut self.collections {
            let ids = collection.active_entities().to_vec();
            for id in ids {
                if let Some(entity) = collection.get_mut(id) {
                    if entity.can_be_used() {
                        entity.last_pos = entity.aabb.pos;
                    }
                }
            }
        }
    }

    /// Drain the context's command queue, including commands issued while
    /// draining
    pub fn apply_commands(&mut self, ctx: &mut Context) {
        while let Some(command) = ctx.pop_command() {
            match command {
                Command::SetActive(target, value) => {
                    if !self.set_active(target, value, ctx) {
                        log::warn!("Can't set activity of missing entity {}", target);
                    }
                }
                Command::Add(collection, entity) => {
                    self.add(collection, *entity, ctx);
                }
                Command::Remove(target) => {
                    self.remove(target, ctx);
                }
                Command::Clear(collection) => self.clear(collection, ctx),
                Command::Deferred(f) => f(self, ctx),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::engine::EngineStage;

    fn named(name: &str) -> Entity {
        Entity::new(Vec2::ZERO, Vec2::ONE).with_name(name)
    }

    #[test]
    fn test_create_find_destroy() {
        let mut ctx = Context::default();
        let mut collections = Collections::new();
        let world = collections.create("world");
        let ui = collections.create("ui");
        assert_ne!(world, ui);
        assert_eq!(collections.find_by_name("ui"), Some(ui));

        collections.add(ui, named("button"), &mut ctx);
        assert!(collections.destroy(ui, &mut ctx));
        assert!(collections.get(ui).is_none());
        assert!(!collections.destroy(ui, &mut ctx));
        assert_eq!(collections.len(), 1);
    }

    #[test]
    fn test_aggregate_views_follow_registration_order() {
        let mut ctx = Context::default();
        let mut collections = Collections::new();
        let a = collections.create("a");
        let b = collections.create("b");
        let b0 = collections.add(b, named("b0"), &mut ctx);
        let a0 = collections.add(a, named("a0"), &mut ctx);

        let all = collections.all_entities();
        assert_eq!(all.len(), 2);
        assert_eq!(all.get(0), a0);
        assert_eq!(all.get(1), b0);
        assert_eq!(collections.find_entity_by_name("b0"), b0);
        assert_eq!(collections.find_entity(|e| e.name.starts_with('a')), a0);
    }

    #[test]
    fn test_commands_apply_in_order() {
        let mut ctx = Context::default();
        let mut collections = Collections::new();
        let world = collections.create("world");
        let target = collections.add(world, named("target"), &mut ctx);
        let Some(target) = target else {
            panic!("add failed");
        };

        ctx.set_active(target, false);
        ctx.spawn(world, named("spawned"));
        ctx.defer(move |collections, ctx| {
            collections.set_active(target, true, ctx);
        });
        collections.apply_commands(&mut ctx);

        assert_eq!(collections.get(world).map(|c| c.len()), Some(2));
        assert!(collections.entity(target).is_some_and(|e| e.is_active()));
    }

    #[test]
    fn test_spawn_during_update_waits_for_queue_processing() {
        let mut ctx = Context::default();
        let mut collections = Collections::new();
        let world = collections.create("world");

        ctx.set_stage(EngineStage::Update);
        ctx.spawn(world, named("late"));
        collections.apply_commands(&mut ctx);
        assert_eq!(collections.all_entities().len(), 0);

        ctx.set_stage(EngineStage::PreFixedUpdate);
        collections.process_queues(&mut ctx);
        assert_eq!(collections.all_entities().len(), 1);
    }
}
