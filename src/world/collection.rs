//! Entity collections
//!
//! A collection owns its entities and keeps four subset caches (active,
//! inactive, static bodies, rigid bodies) in sync with them. Structural
//! changes requested while the engine is mid-iteration are queued and
//! applied at the start of the next fixed tick.

use crate::components::body::BodyKind;
use crate::engine::Context;

use super::{CollectionId, Entity, EntityId, EntityRef, EntityState};

/// Cache lists an entity currently sits in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Membership {
    /// `Some(true)` = active list, `Some(false)` = inactive list
    active: Option<bool>,
    body: Option<BodyKind>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
    /// In `entities`; only listed entities may sit in a cache
    listed: bool,
    membership: Membership,
}

#[derive(Debug)]
pub struct EntityCollection {
    id: CollectionId,
    name: String,

    slots: Vec<Slot>,
    free: Vec<u32>,

    /// Entities in insertion order (everything not waiting for creation)
    entities: Vec<EntityId>,
    active: Vec<EntityId>,
    inactive: Vec<EntityId>,
    static_bodies: Vec<EntityId>,
    rigid_bodies: Vec<EntityId>,

    add_queue: Vec<EntityId>,
    /// Entity plus its index at request time
    remove_queue: Vec<(EntityId, usize)>,
    clear_queued: bool,
}

impl EntityCollection {
    pub(crate) fn new(id: CollectionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slots: Vec::new(),
            free: Vec::new(),
            entities: Vec::new(),
            active: Vec::new(),
            inactive: Vec::new(),
            static_bodies: Vec::new(),
            rigid_bodies: Vec::new(),
            add_queue: Vec::new(),
            remove_queue: Vec::new(),
            clear_queued: false,
        }
    }

    #[inline]
    pub fn id(&self) -> CollectionId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    // === Mutation ===

    /// Take ownership of an entity. The id is valid immediately, but the
    /// entity only joins the lists once the stage allows it.
    pub fn add(&mut self, entity: Entity, ctx: &mut Context) -> EntityId {
        let id = self.alloc(entity);
        let handle = EntityRef::new(self.id, id);
        if let Some(entity) = self.get_mut(id) {
            entity.set_handle(Some(handle));
            entity.set_state(EntityState::QueuedForCreation);
        }

        if ctx.can_add_or_remove_entities() {
            self.list(id);
        } else {
            log::debug!("Queued {} for creation in '{}'", handle, self.name);
            self.add_queue.push(id);
        }
        id
    }

    /// Remove an entity. Returns false if the id is stale or already queued
    /// for deletion.
    pub fn remove(&mut self, id: EntityId, ctx: &mut Context) -> bool {
        let Some(entity) = self.get(id) else {
            log::warn!("Can't remove stale entity {} from '{}'", id, self.name);
            return false;
        };
        if entity.state() == EntityState::QueuedForDeletion {
            return false;
        }
        let index = self.index_of(id).unwrap_or(usize::MAX);
        self.remove_internal(id, index, ctx);
        true
    }

    /// Remove the entity at `index` in insertion order. Out of range is
    /// logged and ignored.
    pub fn remove_at(&mut self, index: usize, ctx: &mut Context) -> bool {
        let Some(&id) = self.entities.get(index) else {
            log::error!("Can't remove entity at index '{}' from '{}'", index, self.name);
            return false;
        };
        if self.get(id).is_some_and(|e| e.state() == EntityState::QueuedForDeletion) {
            return false;
        }
        self.remove_internal(id, index, ctx);
        true
    }

    /// Remove every entity. Creations still waiting in the add queue were
    /// requested before the clear, so they are dropped as well.
    pub fn clear(&mut self, ctx: &mut Context) {
        for id in std::mem::take(&mut self.add_queue) {
            if self.get(id).is_some_and(|e| e.state() == EntityState::QueuedForCreation) {
                self.remove_internal(id, usize::MAX, ctx);
            }
        }

        if ctx.can_add_or_remove_entities() {
            self.clear_now(ctx);
        } else {
            log::debug!("Queued clear of '{}'", self.name);
            self.clear_queued = true;
        }
    }

    /// Apply queued removals. A queued clear, or removals covering every
    /// entity, collapse into a single clear.
    pub fn process_remove_queue(&mut self, ctx: &mut Context) {
        if self.remove_queue.is_empty() && !self.clear_queued {
            return;
        }

        let mut queue = std::mem::take(&mut self.remove_queue);
        let listed = queue
            .iter()
            .filter(|(id, _)| self.index_of(*id).is_some())
            .count();

        if self.clear_queued || listed >= self.entities.len() {
            self.clear_now(ctx);
            self.clear_queued = false;
        }

        // Highest index first, matching the order the requests were made against
        queue.sort_by(|a, b| b.1.cmp(&a.1));
        for (id, _) in queue {
            if self.contains(id) {
                self.remove_now(id, ctx);
            }
        }
    }

    /// Apply queued additions
    pub fn process_add_queue(&mut self) {
        if self.add_queue.is_empty() {
            return;
        }
        let queue = std::mem::take(&mut self.add_queue);
        log::debug!("Adding {} queued entities to '{}'", queue.len(), self.name);
        for id in queue {
            if self.get(id).is_some_and(|e| e.state() == EntityState::QueuedForCreation) {
                self.list(id);
            }
        }
    }

    /// Toggle an entity and update the caches
    pub fn set_active(&mut self, id: EntityId, value: bool, ctx: &mut Context) -> bool {
        self.with_entity_mut(id, |entity| entity.set_active(value, ctx))
            .is_some()
    }

    /// Mutate an entity, then bring the caches back in line with it
    pub fn with_entity_mut<R>(&mut self, id: EntityId, f: impl FnOnce(&mut Entity) -> R) -> Option<R> {
        let result = f(self.get_mut(id)?);
        self.sync_entity(id);
        Some(result)
    }

    /// Recompute which caches an entity belongs to
    pub fn sync_entity(&mut self, id: EntityId) {
        let Some(slot) = self.slot(id) else {
            return;
        };
        let have = slot.membership;
        let want = match &slot.entity {
            Some(entity) if slot.listed => Membership {
                active: Some(entity.is_active()),
                body: if entity.is_active() { entity.body_kind() } else { None },
            },
            _ => Membership::default(),
        };
        if have == want {
            return;
        }

        if have.active != want.active {
            match have.active {
                Some(true) => remove_id(&mut self.active, id),
                Some(false) => remove_id(&mut self.inactive, id),
                None => {}
            }
            match want.active {
                Some(true) => self.active.push(id),
                Some(false) => self.inactive.push(id),
                None => {}
            }
        }

        if have.body != want.body {
            match have.body {
                Some(BodyKind::Static) => remove_id(&mut self.static_bodies, id),
                Some(BodyKind::Rigid) => remove_id(&mut self.rigid_bodies, id),
                None => {}
            }
            match want.body {
                Some(BodyKind::Static) => self.static_bodies.push(id),
                Some(BodyKind::Rigid) => self.rigid_bodies.push(id),
                None => {}
            }
        }

        if let Some(slot) = self.slot_mut(id) {
            slot.membership = want;
        }
    }

    /// Remove everything, queued creations included
    pub(crate) fn destroy(&mut self, ctx: &mut Context) {
        self.clear_now(ctx);
        for id in std::mem::take(&mut self.add_queue) {
            if self.contains(id) {
                self.remove_now(id, ctx);
            }
        }
        self.remove_queue.clear();
        self.clear_queued = false;
    }

    fn remove_internal(&mut self, id: EntityId, index: usize, ctx: &mut Context) {
        if ctx.can_add_or_remove_entities() {
            self.remove_now(id, ctx);
        } else {
            if let Some(entity) = self.get_mut(id) {
                entity.set_state(EntityState::QueuedForDeletion);
            }
            log::debug!("Queued {} for deletion from '{}'", id, self.name);
            self.remove_queue.push((id, index));
        }
    }

    fn list(&mut self, id: EntityId) {
        let Some(slot) = self.slot_mut(id) else {
            return;
        };
        slot.listed = true;
        if let Some(entity) = slot.entity.as_mut() {
            entity.set_state(EntityState::Normal);
        }
        self.entities.push(id);
        self.sync_entity(id);
    }

    fn clear_now(&mut self, ctx: &mut Context) {
        let ids = std::mem::take(&mut self.entities);
        for id in ids {
            self.remove_now(id, ctx);
        }
    }

    fn remove_now(&mut self, id: EntityId, ctx: &mut Context) {
        self.entities.retain(|e| *e != id);
        self.add_queue.retain(|e| *e != id);

        // Dropping out of every cache before cleanup
        if let Some(slot) = self.slot_mut(id) {
            slot.listed = false;
        }
        self.sync_entity(id);

        let Some(slot) = self.slot_mut(id) else {
            return;
        };
        let entity = slot.entity.take();
        slot.generation = slot.generation.wrapping_add(1);
        slot.membership = Membership::default();
        self.free.push(id.index);

        if let Some(mut entity) = entity {
            entity.cleanup_components(ctx);
            entity.set_handle(None);
        }
    }

    fn alloc(&mut self, entity: Entity) -> EntityId {
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index as usize) {
                slot.entity = Some(entity);
                slot.listed = false;
                slot.membership = Membership::default();
                return EntityId {
                    index,
                    generation: slot.generation,
                };
            }
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entity: Some(entity),
            listed: false,
            membership: Membership::default(),
        });
        EntityId { index, generation: 0 }
    }

    fn slot(&self, id: EntityId) -> Option<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    // === Access ===

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slot(id)?.entity.as_ref()
    }

    /// Raw mutable access. Changes to activity or bodies need a
    /// `sync_entity` afterwards; prefer `with_entity_mut`.
    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slot_mut(id)?.entity.as_mut()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Number of entities in the ordered list
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity id at `index` in insertion order
    pub fn id_at(&self, index: usize) -> Option<EntityId> {
        self.entities.get(index).copied()
    }

    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| *e == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .copied()
            .find(|id| self.get(*id).is_some_and(|e| e.name == name))
    }

    /// Listed entities with their ids, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.entities
            .iter()
            .filter_map(|id| self.get(*id).map(|entity| (*id, entity)))
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn active_entities(&self) -> &[EntityId] {
        &self.active
    }

    pub fn inactive_entities(&self) -> &[EntityId] {
        &self.inactive
    }

    pub fn static_bodies(&self) -> &[EntityId] {
        &self.static_bodies
    }

    pub fn rigid_bodies(&self) -> &[EntityId] {
        &self.rigid_bodies
    }

    pub fn pending_additions(&self) -> usize {
        self.add_queue.len()
    }

    pub fn pending_removals(&self) -> usize {
        self.remove_queue.len()
    }

    pub fn is_clear_queued(&self) -> bool {
        self.clear_queued
    }
}

fn remove_id(list: &mut Vec<EntityId>, id: EntityId) {
    if let Some(index) = list.iter().position(|e| *e == id) {
        list.remove(index);
    }
}
