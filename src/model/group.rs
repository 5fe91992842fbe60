use serde::{Deserialize, Serialize};

use crate::common::collections::HashMap;
use crate::model::item::{GridRect, ItemId, LayoutItem, UNSET_LEVEL};

/// Group map keyed by group id. Group objects must always be looked up
/// through the owning state; a synchronization can replace them wholesale.
pub type Groups = HashMap<ItemId, Group>;

/// A named collection of items that moves and resizes as one unit.
///
/// `layout` holds member copies kept in sync with the canonical layout;
/// `rect` is the cached bounding box of those members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: ItemId,
    pub layout: Vec<LayoutItem>,
    pub rect: GridRect,
    /// z values contributed by members; the minimum picks the group's own
    /// paint order.
    #[serde(default)]
    pub level: Vec<i32>,
}

impl Group {
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            layout: Vec::new(),
            rect: GridRect::bounding(&[]),
            level: Vec::new(),
        }
    }

    pub fn contains(&self, id: &ItemId) -> bool { self.layout.iter().any(|i| i.id == *id) }

    pub fn is_empty(&self) -> bool { self.layout.is_empty() }

    pub fn level(&self) -> i32 { self.level.iter().copied().min().unwrap_or(UNSET_LEVEL) }

    pub fn refresh_rect(&mut self) { self.rect = GridRect::bounding(&self.layout); }

    /// Synthetic item covering the group's frame, used as the focus target
    /// when the whole group is selected or dragged.
    pub fn frame_item(&self) -> LayoutItem {
        LayoutItem::new(
            self.id.clone(),
            self.rect.x,
            self.rect.y,
            self.rect.width(),
            self.rect.height(),
        )
    }
}
