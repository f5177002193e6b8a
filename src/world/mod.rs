//! Entities, components and entity collections
//!
//! Entities live in arena slots inside their collection and are addressed by
//! generational ids, so a stale handle to a removed entity resolves to
//! nothing instead of to whatever reused the slot.

pub mod collection;
pub mod component;
pub mod entity;
pub mod proxy;

pub use collection::EntityCollection;
pub use component::{AsAny, Callback, Component, ComponentType, EngineComponentType, GameComponentType};
pub use entity::{Entity, EntityState};
pub use proxy::ProxyView;

use std::fmt;

/// Identifies a registered entity collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(pub(crate) u32);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collection#{}", self.0)
    }
}

/// Arena index plus generation within one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Engine-wide entity handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub collection: CollectionId,
    pub entity: EntityId,
}

impl EntityRef {
    pub fn new(collection: CollectionId, entity: EntityId) -> Self {
        Self { collection, entity }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.entity)
    }
}
