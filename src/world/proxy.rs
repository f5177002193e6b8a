//! Aggregated views over several collections

use super::{CollectionId, EntityId, EntityRef};

/// Read-only concatenation of per-collection id lists, indexed as one sequence
#[derive(Debug, Clone, Default)]
pub struct ProxyView<'a> {
    parts: Vec<(CollectionId, &'a [EntityId])>,
}

impl<'a> ProxyView<'a> {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    pub fn push(&mut self, collection: CollectionId, ids: &'a [EntityId]) {
        self.parts.push((collection, ids));
    }

    pub fn len(&self) -> usize {
        self.parts.iter().map(|(_, ids)| ids.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|(_, ids)| ids.is_empty())
    }

    /// Entity at a flat index across all parts
    pub fn get(&self, mut index: usize) -> Option<EntityRef> {
        for (collection, ids) in &self.parts {
            if index < ids.len() {
                return Some(EntityRef::new(*collection, ids[index]));
            }
            index -= ids.len();
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityRef> + '_ {
        self.parts
            .iter()
            .flat_map(|(collection, ids)| ids.iter().map(move |id| EntityRef::new(*collection, *id)))
    }

    /// Flat index of the first entity matching `predicate`
    pub fn find_index(&self, predicate: impl FnMut(EntityRef) -> bool) -> Option<usize> {
        self.iter().position(predicate)
    }

    /// Owned snapshot, safe to hold while mutating the collections
    pub fn to_vec(&self) -> Vec<EntityRef> {
        self.iter().collect()
    }
}
