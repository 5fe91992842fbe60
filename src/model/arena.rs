use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::common::collections::HashMap;
use crate::model::item::{ItemId, LayoutItem};

slotmap::new_key_type! { pub struct ItemKey; }

/// Canonical item storage: a slotmap arena plus a declared order and an
/// id-to-key side map, so lookups never scan and list order survives
/// merges.
///
/// Serializes as the plain ordered item list; the index is rebuilt on
/// deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<LayoutItem>", into = "Vec<LayoutItem>")]
pub struct LayoutArena {
    items: SlotMap<ItemKey, LayoutItem>,
    order: Vec<ItemKey>,
    by_id: HashMap<ItemId, ItemKey>,
}

impl From<Vec<LayoutItem>> for LayoutArena {
    fn from(items: Vec<LayoutItem>) -> Self {
        let mut arena = LayoutArena::default();
        for item in items {
            arena.insert(item);
        }
        arena
    }
}

impl From<LayoutArena> for Vec<LayoutItem> {
    fn from(arena: LayoutArena) -> Self {
        arena.order.iter().filter_map(|&key| arena.items.get(key).cloned()).collect()
    }
}

impl LayoutArena {
    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    pub fn contains(&self, id: &ItemId) -> bool { self.by_id.contains_key(id) }

    pub fn get(&self, id: &ItemId) -> Option<&LayoutItem> {
        self.by_id.get(id).and_then(|&key| self.items.get(key))
    }

    pub fn get_mut(&mut self, id: &ItemId) -> Option<&mut LayoutItem> {
        self.by_id.get(id).and_then(|&key| self.items.get_mut(key))
    }

    /// Insert an item, replacing in place (order preserved) when the id is
    /// already present.
    pub fn insert(&mut self, item: LayoutItem) -> ItemKey {
        if let Some(&key) = self.by_id.get(&item.id) {
            self.items[key] = item;
            return key;
        }
        let id = item.id.clone();
        let key = self.items.insert(item);
        self.order.push(key);
        self.by_id.insert(id, key);
        key
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<LayoutItem> {
        let key = self.by_id.remove(id)?;
        self.order.retain(|&k| k != key);
        self.items.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayoutItem> {
        self.order.iter().filter_map(|&key| self.items.get(key))
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut LayoutItem)) {
        for &key in &self.order {
            if let Some(item) = self.items.get_mut(key) {
                f(item);
            }
        }
    }

    pub fn to_vec(&self) -> Vec<LayoutItem> { self.iter().cloned().collect() }

    /// Replace the whole layout, keeping arena identity. Used by
    /// synchronization and compaction write-back.
    pub fn replace_all(&mut self, items: Vec<LayoutItem>) {
        self.items.clear();
        self.order.clear();
        self.by_id.clear();
        for item in items {
            self.insert(item);
        }
    }

    /// Fold a partial update into the canonical layout: patch wins on
    /// matched ids (order kept), unmatched patch items append.
    pub fn merge(&mut self, patch: Vec<LayoutItem>) { self.merge_with(patch, |_| {}) }

    /// `merge` with a post-assignment hook applied to every matched item.
    pub fn merge_with(&mut self, patch: Vec<LayoutItem>, mut apply: impl FnMut(&mut LayoutItem)) {
        for incoming in patch {
            match self.by_id.get(&incoming.id) {
                Some(&key) => {
                    let slot = &mut self.items[key];
                    *slot = incoming;
                    apply(slot);
                }
                None => {
                    self.insert(incoming);
                }
            }
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&LayoutItem) -> bool) {
        let mut dropped = Vec::new();
        self.order.retain(|&key| match self.items.get(key) {
            Some(item) if keep(item) => true,
            Some(item) => {
                dropped.push((key, item.id.clone()));
                false
            }
            None => false,
        });
        for (key, id) in dropped {
            self.items.remove(key);
            self.by_id.remove(&id);
        }
    }
}
