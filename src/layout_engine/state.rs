//! Canonical layout state: the item arena, the group map, and the drag /
//! resize / selection session machinery around them.
//!
//! Lookup misses degrade to no-ops; the only hard failure is querying
//! geometry before the state has been synchronized against the declared
//! children.

use tracing::{debug, trace, warn};

use crate::common::collections::{BTreeMap, HashMap};
use crate::layout_engine::collision::{CompactKind, compact, correct_bounds};
use crate::layout_engine::error::LayoutError;
use crate::layout_engine::geometry::constrain_size;
use crate::layout_engine::grouping::{
    PickOption, StretchParams, auto_fit, group_layout, hoist_selection_by_parent, pick_by_rect,
    stretch_layout,
};
use crate::layout_engine::mover::{MoveTo, move_element};
use crate::layout_engine::utils;
use crate::model::{
    Group, GridRect, Groups, ItemId, LayoutArena, LayoutItem, StretchAxes, UNSET_LEVEL,
};

/// One declared child: the consumer's id plus an optional placement hint
/// used when the id is new to the layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSlot {
    pub id: ItemId,
    pub hint: Option<LayoutItem>,
}

impl ChildSlot {
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            hint: None,
        }
    }

    pub fn with_hint(id: impl Into<ItemId>, hint: LayoutItem) -> Self {
        Self {
            id: id.into(),
            hint: Some(hint),
        }
    }
}

/// A positioned move: absolute target per axis (absent axis keeps its
/// value) plus the gesture delta, already normalized to grid units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveRequest {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub dx: f64,
    pub dy: f64,
}

/// A resized frame in grid units. Sizes are constrained per item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeRequest {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// What the renderer draws, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Group {
        group: Group,
        active: bool,
        selected: bool,
    },
    Item {
        item: LayoutItem,
        active: bool,
        selected: bool,
    },
}

#[derive(Debug, Clone, Default)]
struct LevelSlot {
    groups: Vec<ItemId>,
    items: Vec<ItemId>,
}

/// The layout state machine.
#[derive(Debug, Default)]
pub struct LayoutState {
    layout: LayoutArena,
    groups: Groups,
    cols: f64,
    bottom: f64,
    focus_item: Option<LayoutItem>,
    /// Active group by id, always resolved through `groups` on use.
    active_group: Option<ItemId>,
    old_drag_item: Option<LayoutItem>,
    old_active_group: Option<ItemId>,
    /// Layout snapshot taken at session start, for change detection.
    old_layout: Option<Vec<LayoutItem>>,
    active_drag: Option<LayoutItem>,
    placeholder: Option<LayoutItem>,
    dragging: bool,
    selecting: bool,
    selected: Vec<LayoutItem>,
    temporary_group: Option<ItemId>,
    level_map: BTreeMap<i32, LevelSlot>,
    synchronized: bool,
}

impl LayoutState {
    pub fn new(cols: f64) -> Self {
        Self {
            cols,
            ..Self::default()
        }
    }

    pub fn layout(&self) -> Vec<LayoutItem> { self.layout.to_vec() }

    pub fn item(&self, id: &ItemId) -> Option<&LayoutItem> { self.layout.get(id) }

    pub fn groups(&self) -> &Groups { &self.groups }

    pub fn cols(&self) -> f64 { self.cols }

    pub fn bottom(&self) -> f64 { self.bottom }

    pub fn focus_item(&self) -> Option<&LayoutItem> { self.focus_item.as_ref() }

    pub fn active_group(&self) -> Option<&ItemId> { self.active_group.as_ref() }

    pub fn placeholder(&self) -> Option<&LayoutItem> { self.placeholder.as_ref() }

    pub fn active_drag(&self) -> Option<&LayoutItem> { self.active_drag.as_ref() }

    pub fn is_dragging(&self) -> bool { self.dragging }

    pub fn is_selecting(&self) -> bool { self.selecting }

    pub fn selected(&self) -> &[LayoutItem] { &self.selected }

    pub fn temporary_group(&self) -> Option<&ItemId> { self.temporary_group.as_ref() }

    /// Reconcile the layout against the declared children.
    ///
    /// Known ids keep their geometry; new ids take the hint or a unit cell
    /// at the current bottom; undeclared ids are dropped. Group
    /// memberships are rebuilt from the surviving items, dangling parents
    /// stripped, empty groups deleted and stale focus cleared. Must run
    /// before [`LayoutState::children`].
    pub fn synchronize_layout_with_children(&mut self, children: &[ChildSlot]) {
        let baseline = utils::bottom(&self.layout.to_vec());

        let mut parent_map: HashMap<ItemId, ItemId> = HashMap::default();
        for (gid, group) in &self.groups {
            for member in &group.layout {
                parent_map.insert(member.id.clone(), gid.clone());
            }
        }

        let mut next: Vec<LayoutItem> = Vec::with_capacity(children.len());
        for slot in children {
            let mut item = match self.layout.get(&slot.id) {
                Some(existing) => existing.clone(),
                None => match &slot.hint {
                    Some(hint) => {
                        let mut hinted = hint.clone();
                        hinted.id = slot.id.clone();
                        hinted
                    }
                    None => LayoutItem::new(slot.id.clone(), 0.0, baseline, 1.0, 1.0),
                },
            };
            let declared = item.parent.take().or_else(|| parent_map.get(&slot.id).cloned());
            item.parent = match declared {
                Some(gid) if self.groups.contains_key(&gid) => Some(gid),
                Some(gid) => {
                    warn!(group = %gid, id = %slot.id, "stripping dangling parent");
                    None
                }
                None => None,
            };
            next.push(item);
        }

        correct_bounds(&mut next, self.cols);
        self.layout.replace_all(next);

        for group in self.groups.values_mut() {
            group.layout.clear();
            group.level.clear();
        }
        for item in self.layout.iter() {
            if let Some(gid) = &item.parent
                && let Some(group) = self.groups.get_mut(gid)
            {
                if let Some(z) = item.z
                    && z != UNSET_LEVEL
                {
                    group.level.push(z);
                }
                group.layout.push(item.clone());
            }
        }
        self.groups.retain(|_, group| !group.is_empty());
        for group in self.groups.values_mut() {
            group.refresh_rect();
        }

        if let Some(focus) = &self.focus_item
            && !self.layout.contains(&focus.id)
            && !self.groups.contains_key(&focus.id)
        {
            self.focus_item = None;
        }
        if let Some(gid) = &self.active_group
            && !self.groups.contains_key(gid)
        {
            self.active_group = None;
        }
        if let Some(gid) = &self.temporary_group
            && !self.groups.contains_key(gid)
        {
            self.temporary_group = None;
        }
        let layout = &self.layout;
        self.selected.retain(|item| layout.contains(&item.id));

        self.bottom = utils::bottom(&self.layout.to_vec());
        self.rebuild_level_map();
        self.synchronized = true;
        debug!(
            items = self.layout.len(),
            groups = self.groups.len(),
            bottom = self.bottom,
            "synchronized layout"
        );
    }

    /// Render list in ascending paint level, groups before loose items
    /// within a level. Grouped items render inside their group node.
    pub fn children(&self) -> Result<Vec<RenderNode>, LayoutError> {
        if !self.synchronized {
            return Err(LayoutError::NotSynchronized);
        }
        let mut nodes = Vec::new();
        for slot in self.level_map.values() {
            for gid in &slot.groups {
                let Some(group) = self.groups.get(gid) else { continue };
                if group.is_empty() {
                    continue;
                }
                nodes.push(RenderNode::Group {
                    group: group.clone(),
                    active: self.active_group.as_ref() == Some(gid),
                    selected: self.temporary_group.as_ref() == Some(gid),
                });
            }
            for id in &slot.items {
                let Some(item) = self.layout.get(id) else { continue };
                nodes.push(RenderNode::Item {
                    item: item.clone(),
                    active: self.focus_item.as_ref().is_some_and(|f| f.id == *id),
                    selected: self.selected.iter().any(|s| s.id == *id),
                });
            }
        }
        Ok(nodes)
    }

    /// Move an item or a whole group.
    ///
    /// A group target (or a grouped member with `move_with_parent`)
    /// translates every member by the gesture delta; a single item takes
    /// the absolute position. A miss clears the placeholder and does
    /// nothing else.
    pub fn move_item(&mut self, id: &ItemId, req: MoveRequest, move_with_parent: bool) {
        let group_id = if self.groups.contains_key(id) {
            Some(id.clone())
        } else if move_with_parent {
            self.layout.get(id).and_then(|item| item.parent.clone())
        } else {
            None
        };
        if let Some(gid) = group_id {
            self.move_group(&gid, req.dx, req.dy);
            return;
        }

        let Some(item) = self.layout.get_mut(id) else {
            self.placeholder = None;
            return;
        };
        move_element(item, MoveTo { x: req.x, y: req.y }, false);
        let ghost = item.ghost(item.id.clone());
        let frame = item.clone();
        let parent = item.parent.clone();
        self.placeholder = Some(ghost);
        self.refresh_focus_frame(id, &frame);
        if let Some(gid) = parent {
            self.resync_group(&gid);
        }
        trace!(%id, "moved item");
    }

    fn move_group(&mut self, gid: &ItemId, dx: f64, dy: f64) {
        let Some(group) = self.groups.get(gid) else {
            self.placeholder = None;
            return;
        };
        let mut members = group.layout.clone();
        for member in &mut members {
            // Members move as one unit, statics included.
            move_element(member, MoveTo::to(member.x + dx, member.y + dy), true);
        }
        self.layout.merge(members);
        self.resync_group(gid);
        if let Some(group) = self.groups.get(gid) {
            let frame = group.frame_item();
            self.placeholder = Some(frame.ghost(gid.clone()));
            self.refresh_focus_frame(gid, &frame);
        }
        trace!(group = %gid, dx, dy, "moved group");
    }

    /// Resize an item (min/max constrained) or stretch a group's members
    /// into the new frame.
    pub fn resize_item(&mut self, id: &ItemId, req: ResizeRequest) {
        if self.groups.contains_key(id) {
            self.resize_group(id, req);
            return;
        }
        let Some(item) = self.layout.get_mut(id) else {
            self.placeholder = None;
            return;
        };
        item.x = req.x;
        item.y = req.y;
        item.w = constrain_size(req.w, item.min_w, item.max_w);
        item.h = constrain_size(req.h, item.min_h, item.max_h);
        let mut ghost = item.ghost(item.id.clone());
        ghost.is_static = true;
        let frame = item.clone();
        let parent = item.parent.clone();
        self.placeholder = Some(ghost);
        self.refresh_focus_frame(id, &frame);
        if let Some(gid) = parent {
            self.resync_group(&gid);
        }
    }

    fn resize_group(&mut self, gid: &ItemId, req: ResizeRequest) {
        let Some(group) = self.groups.get(gid) else {
            self.placeholder = None;
            return;
        };
        let target = GridRect::from_size(req.x, req.y, req.w, req.h);
        let stretched = stretch_layout(&group.layout, target, StretchParams::default());
        self.layout.merge(stretched);
        self.resync_group(gid);
        if let Some(group) = self.groups.get(gid) {
            let frame = group.frame_item();
            let mut ghost = frame.ghost(gid.clone());
            ghost.is_static = true;
            self.placeholder = Some(ghost);
            self.refresh_focus_frame(gid, &frame);
        }
    }

    /// Focus an item or group. Static items silently refuse focus.
    pub fn focus(&mut self, id: &ItemId) {
        if let Some(group) = self.groups.get(id) {
            self.focus_item = Some(group.frame_item());
            self.active_group = Some(id.clone());
            return;
        }
        match self.layout.get(id) {
            Some(item) if item.is_static => {}
            Some(item) => {
                self.focus_item = Some(item.clone());
                self.active_group = None;
            }
            None => {}
        }
    }

    pub fn start_drag(&mut self, id: &ItemId) {
        self.snapshot(id);
        self.focus(id);
        debug!(%id, "drag session started");
    }

    pub fn start_resize(&mut self, id: &ItemId) {
        self.snapshot(id);
        self.focus(id);
        debug!(%id, "resize session started");
    }

    /// Promote the current placeholder to the live drag ghost.
    pub fn drag(&mut self) {
        self.active_drag = self.placeholder.clone();
        self.dragging = true;
    }

    /// End a drag session. Returns the committed layout only when it
    /// differs from the session-start snapshot, so a caller sees at most
    /// one change notification per session.
    pub fn end_drag(&mut self) -> Option<Vec<LayoutItem>> {
        let changed = self.commit();
        debug!(changed = changed.is_some(), "drag session ended");
        changed
    }

    /// End a resize session. A stretch-carrying group member snaps back to
    /// fill its parent frame on the opted-in axes before the commit.
    pub fn end_resize(&mut self, id: &ItemId) -> Option<Vec<LayoutItem>> {
        if let Some(item) = self.layout.get(id).cloned()
            && item.stretch != StretchAxes::None
            && let Some(gid) = item.parent.clone()
            && let Some(rect) = self.groups.get(&gid).map(|g| g.rect)
        {
            let snapped = auto_fit(&[item], rect);
            self.layout.merge(snapped);
            self.resync_group(&gid);
        }
        let changed = self.commit();
        debug!(changed = changed.is_some(), "resize session ended");
        changed
    }

    /// Fold a partial update into the layout, then keep every affected
    /// group consistent: memberships and rects resync, and stretch-carrying
    /// members re-fit the group frame.
    pub fn merge(&mut self, patch: Vec<LayoutItem>) {
        let mut affected: Vec<ItemId> = Vec::new();
        for item in &patch {
            let gid = item
                .parent
                .clone()
                .or_else(|| self.layout.get(&item.id).and_then(|e| e.parent.clone()));
            if let Some(gid) = gid
                && !affected.contains(&gid)
            {
                affected.push(gid);
            }
        }
        self.layout.merge(patch);
        for gid in affected {
            self.resync_group(&gid);
            if let Some(group) = self.groups.get(&gid) {
                let fitted = auto_fit(&group.layout, group.rect);
                self.layout.merge(fitted);
            }
            self.resync_group(&gid);
        }
        self.bottom = utils::bottom(&self.layout.to_vec());
        self.rebuild_level_map();
    }

    /// Group the named items under `id`. Missing members are skipped; an
    /// entirely missing membership creates nothing.
    pub fn add_group(&mut self, id: ItemId, members: &[ItemId]) {
        let items: Vec<LayoutItem> =
            members.iter().filter_map(|m| self.layout.get(m).cloned()).collect();
        if items.is_empty() {
            warn!(group = %id, "refusing to create empty group");
            return;
        }
        let group = group_layout(&items, &id);
        self.layout.merge(group.layout.clone());
        debug!(group = %id, members = group.layout.len(), "created group");
        self.groups.insert(id, group);
        self.rebuild_level_map();
    }

    /// Delete a group, restoring each member's previous parent. Members
    /// whose lineage points at the deleted group itself become ungrouped.
    pub fn delete_group(&mut self, id: &ItemId) {
        if self.groups.remove(id).is_none() {
            return;
        }
        let mut restored: Vec<ItemId> = Vec::new();
        self.layout.for_each_mut(|item| {
            if item.parent.as_ref() == Some(id) {
                let prev = item.prev_parent.take();
                item.parent = match prev {
                    Some(gid) if gid != *id => {
                        restored.push(gid.clone());
                        Some(gid)
                    }
                    _ => None,
                };
            }
        });
        for gid in restored {
            self.resync_group(&gid);
        }
        if self.active_group.as_ref() == Some(id) {
            self.active_group = None;
        }
        if self.temporary_group.as_ref() == Some(id) {
            self.temporary_group = None;
        }
        if self.focus_item.as_ref().is_some_and(|f| f.id == *id) {
            self.focus_item = None;
        }
        debug!(group = %id, "deleted group");
        self.rebuild_level_map();
    }

    /// Begin a rectangular selection. Any temporary group from a previous
    /// selection dissolves first.
    pub fn start_selection(&mut self) {
        if let Some(temp) = self.temporary_group.take() {
            self.delete_group(&temp);
        }
        self.selecting = true;
        self.focus_item = None;
        self.active_group = None;
        self.selected.clear();
    }

    pub fn select_by_rect(&mut self, rect: GridRect) {
        if !self.selecting {
            return;
        }
        self.selected = pick_by_rect(&self.layout.to_vec(), rect, PickOption::Contain);
    }

    /// End the selection: hoist it to full group memberships, bind the
    /// result into a temporary group under a fresh synthetic id, and focus
    /// the group frame. Returns the hoisted selection.
    pub fn end_selection(&mut self) -> Vec<LayoutItem> {
        self.selecting = false;
        let hoisted = hoist_selection_by_parent(&self.selected, &self.groups);
        if hoisted.is_empty() {
            self.selected.clear();
            return Vec::new();
        }

        let gid = ItemId::synthetic();
        let mut group = Group::new(gid.clone());
        for item in &hoisted {
            let mut member = item.clone();
            member.prev_parent = member.parent.take();
            member.parent = Some(gid.clone());
            if let Some(z) = member.z
                && z != UNSET_LEVEL
            {
                group.level.push(z);
            }
            group.layout.push(member);
        }
        group.refresh_rect();
        self.layout.merge(group.layout.clone());
        self.focus_item = Some(group.frame_item());
        self.active_group = Some(gid.clone());
        debug!(group = %gid, members = group.layout.len(), "formed temporary selection group");
        self.groups.insert(gid.clone(), group);
        self.temporary_group = Some(gid);
        self.selected = hoisted.clone();
        self.rebuild_level_map();
        hoisted
    }

    /// Repack the whole layout and resync every group to the result.
    pub fn compact_layout(&mut self, kind: CompactKind) -> Vec<LayoutItem> {
        let packed = compact(&self.layout.to_vec(), kind, self.cols);
        self.layout.replace_all(packed.clone());
        let gids: Vec<ItemId> = self.groups.keys().cloned().collect();
        for gid in gids {
            self.resync_group(&gid);
        }
        self.bottom = utils::bottom(&packed);
        self.rebuild_level_map();
        packed
    }

    /// Apply an in-place edit to one item, keeping its group and the
    /// render order consistent. A miss is a no-op.
    pub fn update_item(&mut self, id: &ItemId, edit: impl FnOnce(&mut LayoutItem)) {
        let Some(item) = self.layout.get_mut(id) else { return };
        edit(item);
        let parent = item.parent.clone();
        if let Some(gid) = parent {
            self.resync_group(&gid);
        }
        self.rebuild_level_map();
    }

    /// Highest explicit paint level in the layout.
    pub fn max_level(&self) -> i32 {
        self.layout.iter().filter_map(|i| i.z).max().unwrap_or(0)
    }

    fn snapshot(&mut self, id: &ItemId) {
        self.old_layout = Some(self.layout.to_vec());
        self.old_active_group = self.active_group.clone();
        self.old_drag_item = self
            .layout
            .get(id)
            .cloned()
            .or_else(|| self.groups.get(id).map(Group::frame_item));
    }

    fn commit(&mut self) -> Option<Vec<LayoutItem>> {
        let old = self.old_layout.take();
        self.old_drag_item = None;
        self.old_active_group = None;
        self.placeholder = None;
        self.active_drag = None;
        self.dragging = false;
        let current = self.layout.to_vec();
        self.bottom = utils::bottom(&current);
        self.rebuild_level_map();
        match old {
            Some(old) if !utils::layout_equal(&old, &current) => Some(current),
            _ => None,
        }
    }

    /// Rebuild a group's member copies, levels and rect from the arena.
    fn resync_group(&mut self, gid: &ItemId) {
        let members: Vec<LayoutItem> =
            self.layout.iter().filter(|i| i.parent.as_ref() == Some(gid)).cloned().collect();
        if let Some(group) = self.groups.get_mut(gid) {
            group.level = members
                .iter()
                .filter_map(|m| m.z)
                .filter(|&z| z != UNSET_LEVEL)
                .collect();
            group.layout = members;
            group.refresh_rect();
        }
    }

    fn refresh_focus_frame(&mut self, id: &ItemId, frame: &LayoutItem) {
        if let Some(focus) = &mut self.focus_item
            && focus.id == *id
        {
            focus.x = frame.x;
            focus.y = frame.y;
            focus.w = frame.w;
            focus.h = frame.h;
        }
    }

    fn rebuild_level_map(&mut self) {
        self.level_map.clear();
        for (gid, group) in &self.groups {
            self.level_map.entry(group.level()).or_default().groups.push(gid.clone());
        }
        for item in self.layout.iter() {
            if item.parent.is_none() {
                self.level_map.entry(item.level()).or_default().items.push(item.id.clone());
            }
        }
        for slot in self.level_map.values_mut() {
            slot.groups.sort();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    fn item(id: &str, x: f64, y: f64, w: f64, h: f64) -> LayoutItem {
        LayoutItem::new(id, x, y, w, h)
    }

    fn synced(items: Vec<LayoutItem>, cols: f64) -> LayoutState {
        let mut state = LayoutState::new(cols);
        let slots: Vec<ChildSlot> =
            items.iter().map(|i| ChildSlot::with_hint(i.id.clone(), i.clone())).collect();
        state.synchronize_layout_with_children(&slots);
        state
    }

    fn assert_group_rects(state: &LayoutState) {
        for group in state.groups().values() {
            assert_eq!(group.rect, GridRect::bounding(&group.layout), "rect drifted for {}", group.id);
        }
    }

    #[test]
    fn children_before_sync_is_an_error() {
        let state = LayoutState::new(12.0);
        assert_eq!(state.children(), Err(LayoutError::NotSynchronized));
    }

    #[test]
    fn sync_places_new_ids_at_bottom() {
        let mut state = synced(vec![item("a", 0.0, 0.0, 2.0, 3.0)], 12.0);
        state.synchronize_layout_with_children(&[
            ChildSlot::new("a"),
            ChildSlot::new("fresh"),
            ChildSlot::with_hint("hinted", item("x", 4.0, 0.0, 2.0, 2.0)),
        ]);
        let fresh = state.layout().into_iter().find(|i| i.id == "fresh".into()).unwrap();
        assert_eq!((fresh.x, fresh.y, fresh.w, fresh.h), (0.0, 3.0, 1.0, 1.0));
        let hinted = state.layout().into_iter().find(|i| i.id == "hinted".into()).unwrap();
        assert_eq!((hinted.x, hinted.w), (4.0, 2.0));
        assert_eq!(hinted.id, "hinted".into());
    }

    #[test]
    fn sync_drops_undeclared_and_heals_dangling_parents() {
        let mut orphan = item("orphan", 0.0, 0.0, 1.0, 1.0);
        orphan.parent = Some(ItemId::real("no-such-group"));
        let mut state = synced(vec![orphan, item("gone", 5.0, 0.0, 1.0, 1.0)], 12.0);
        state.synchronize_layout_with_children(&[ChildSlot::new("orphan")]);

        let layout = state.layout();
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].parent, None);
    }

    #[test]
    fn sync_rebuilds_group_membership_and_deletes_empty() {
        let mut state = synced(
            vec![item("a", 0.0, 0.0, 2.0, 2.0), item("b", 4.0, 0.0, 2.0, 2.0)],
            12.0,
        );
        state.add_group(ItemId::real("g"), &["a".into(), "b".into()]);

        // Drop "b"; the group shrinks to one member.
        state.synchronize_layout_with_children(&[ChildSlot::new("a")]);
        let group = state.groups().get(&ItemId::real("g")).unwrap();
        assert_eq!(group.layout.len(), 1);
        assert_group_rects(&state);

        // Drop "a" too; the empty group disappears.
        state.synchronize_layout_with_children(&[]);
        assert!(state.groups().is_empty());
    }

    #[test]
    fn children_orders_by_level_groups_first() {
        let mut a = item("a", 0.0, 0.0, 1.0, 1.0);
        a.z = Some(5);
        let b = item("b", 2.0, 0.0, 1.0, 1.0); // unset level renders first
        let c = item("c", 4.0, 0.0, 1.0, 1.0);
        let d = item("d", 6.0, 0.0, 1.0, 1.0);
        let mut state = synced(vec![a, b, c, d], 12.0);
        state.add_group(ItemId::real("g"), &["c".into(), "d".into()]);

        let nodes = state.children().unwrap();
        let tags: Vec<String> = nodes
            .iter()
            .map(|n| match n {
                RenderNode::Group { group, .. } => format!("g:{}", group.id),
                RenderNode::Item { item, .. } => format!("i:{}", item.id),
            })
            .collect();
        // Group level is UNSET (members carry no z), so it leads; then "b",
        // then "a" at level 5.
        assert_eq!(tags, vec!["g:g", "i:b", "i:a"]);
    }

    #[test]
    fn group_drag_translates_every_member() {
        // Dragging the group by (10,10) carries both members.
        let mut state = synced(
            vec![item("a", 10.0, 10.0, 10.0, 10.0), item("b", 25.0, 10.0, 5.0, 5.0)],
            50.0,
        );
        state.add_group(ItemId::real("g"), &["a".into(), "b".into()]);
        state.start_drag(&"g".into());
        state.move_item(
            &"g".into(),
            MoveRequest {
                x: None,
                y: None,
                dx: 10.0,
                dy: 10.0,
            },
            true,
        );
        state.drag();

        let layout = state.layout();
        let a = layout.iter().find(|i| i.id == "a".into()).unwrap();
        let b = layout.iter().find(|i| i.id == "b".into()).unwrap();
        assert_eq!((a.x, a.y), (20.0, 20.0));
        assert_eq!((b.x, b.y), (35.0, 20.0));
        assert_group_rects(&state);
        assert!(state.is_dragging());
        assert!(state.placeholder().is_some());

        let changed = state.end_drag();
        assert!(changed.is_some());
        assert!(state.placeholder().is_none());
        assert!(!state.is_dragging());
    }

    #[test]
    fn member_drag_with_parent_moves_whole_group() {
        let mut state = synced(
            vec![item("a", 0.0, 0.0, 2.0, 2.0), item("b", 4.0, 0.0, 2.0, 2.0)],
            20.0,
        );
        state.add_group(ItemId::real("g"), &["a".into(), "b".into()]);
        state.move_item(
            &"a".into(),
            MoveRequest {
                x: None,
                y: None,
                dx: 1.0,
                dy: 2.0,
            },
            true,
        );
        let layout = state.layout();
        assert_eq!(layout.iter().find(|i| i.id == "b".into()).unwrap().y, 2.0);
        assert_group_rects(&state);
    }

    #[test]
    fn move_miss_clears_placeholder() {
        let mut state = synced(vec![item("a", 0.0, 0.0, 1.0, 1.0)], 12.0);
        state.move_item(&"a".into(), MoveRequest { x: Some(2.0), y: Some(0.0), dx: 2.0, dy: 0.0 }, false);
        assert!(state.placeholder().is_some());
        state.move_item(&"missing".into(), MoveRequest::default(), false);
        assert!(state.placeholder().is_none());
    }

    #[test]
    fn change_detection_fires_once_per_session() {
        let mut state = synced(vec![item("a", 0.0, 0.0, 2.0, 2.0)], 12.0);

        // Untouched session reports nothing.
        state.start_drag(&"a".into());
        assert_eq!(state.end_drag(), None);

        state.start_drag(&"a".into());
        state.move_item(&"a".into(), MoveRequest { x: Some(3.0), y: Some(0.0), dx: 3.0, dy: 0.0 }, false);
        assert!(state.end_drag().is_some());
        // No second notification without a new session.
        assert_eq!(state.end_drag(), None);
    }

    #[test]
    fn resize_respects_min_max() {
        let mut constrained = item("a", 0.0, 0.0, 4.0, 4.0);
        constrained.min_w = Some(2.0);
        constrained.max_h = Some(5.0);
        let mut state = synced(vec![constrained], 12.0);
        state.resize_item(&"a".into(), ResizeRequest { x: 0.0, y: 0.0, w: 1.0, h: 9.0 });
        let a = state.layout().remove(0);
        assert_eq!((a.w, a.h), (2.0, 5.0));
        let ghost = state.placeholder().unwrap();
        assert!(ghost.is_static);
    }

    #[test]
    fn group_resize_stretches_members_into_frame() {
        let mut a = item("a", 0.0, 0.0, 10.0, 10.0);
        a.stretch = StretchAxes::Both;
        let mut state = synced(vec![a], 50.0);
        state.add_group(ItemId::real("g"), &["a".into()]);
        state.resize_item(&"g".into(), ResizeRequest { x: 5.0, y: 5.0, w: 20.0, h: 20.0 });

        let a = state.layout().remove(0);
        assert_eq!((a.x, a.y, a.w, a.h), (5.0, 5.0, 20.0, 20.0));
        assert_group_rects(&state);
    }

    #[test]
    fn static_items_refuse_focus() {
        let mut s = item("s", 0.0, 0.0, 2.0, 2.0);
        s.is_static = true;
        let mut state = synced(vec![s, item("a", 4.0, 0.0, 1.0, 1.0)], 12.0);
        state.focus(&"s".into());
        assert!(state.focus_item().is_none());
        state.focus(&"a".into());
        assert_eq!(state.focus_item().unwrap().id, "a".into());
    }

    #[test]
    fn selection_forms_temporary_group_and_hoists() {
        let mut state = synced(
            vec![
                item("a", 0.0, 0.0, 2.0, 2.0),
                item("b", 4.0, 4.0, 2.0, 2.0),
                item("c", 8.0, 0.0, 2.0, 2.0),
            ],
            12.0,
        );
        state.add_group(ItemId::real("g1"), &["a".into(), "b".into()]);

        state.start_selection();
        // Sweep touches "a" and "c" only; "b" rides in through its group.
        state.select_by_rect(GridRect::new(-1.0, -1.0, 10.5, 2.5));
        assert_eq!(state.selected().len(), 2);
        let hoisted = state.end_selection();

        let ids: Vec<String> = hoisted.iter().map(|i| i.id.to_string()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let temp = state.temporary_group().cloned().unwrap();
        assert!(temp.is_synthetic());
        let group = state.groups().get(&temp).unwrap();
        assert_eq!(group.layout.len(), 3);
        for member in &group.layout {
            assert_eq!(member.parent, Some(temp.clone()));
        }
        assert_eq!(state.focus_item().unwrap().id, temp);
        assert_eq!(state.active_group(), Some(&temp));

        // A new selection dissolves the temporary group and restores the
        // members' previous parents.
        state.start_selection();
        assert!(state.temporary_group().is_none());
        let a = state.layout().into_iter().find(|i| i.id == "a".into()).unwrap();
        assert_eq!(a.parent, Some(ItemId::real("g1")));
        let c = state.layout().into_iter().find(|i| i.id == "c".into()).unwrap();
        assert_eq!(c.parent, None);
        assert_group_rects(&state);
    }

    #[test]
    fn delete_group_ungroups_members() {
        let mut state = synced(
            vec![item("a", 0.0, 0.0, 2.0, 2.0), item("b", 4.0, 0.0, 2.0, 2.0)],
            12.0,
        );
        state.add_group(ItemId::real("g"), &["a".into(), "b".into()]);
        state.focus(&"g".into());
        state.delete_group(&"g".into());

        assert!(state.groups().is_empty());
        assert!(state.focus_item().is_none());
        assert!(state.active_group().is_none());
        for i in state.layout() {
            assert_eq!(i.parent, None);
        }
    }

    #[test]
    fn merge_keeps_groups_consistent() {
        let mut state = synced(
            vec![item("a", 0.0, 0.0, 2.0, 2.0), item("b", 4.0, 0.0, 2.0, 2.0)],
            20.0,
        );
        state.add_group(ItemId::real("g"), &["a".into(), "b".into()]);

        let mut patch = item("b", 8.0, 2.0, 2.0, 2.0);
        patch.parent = Some(ItemId::real("g"));
        state.merge(vec![patch]);

        assert_group_rects(&state);
        let group = state.groups().get(&ItemId::real("g")).unwrap();
        assert_eq!(group.rect, GridRect::new(0.0, 0.0, 10.0, 4.0));
        assert_eq!(state.bottom(), 4.0);
    }

    #[test]
    fn compact_through_state_updates_bottom_and_groups() {
        let mut state = synced(
            vec![item("a", 0.0, 5.0, 2.0, 2.0), item("b", 0.0, 9.0, 2.0, 2.0)],
            12.0,
        );
        state.add_group(ItemId::real("g"), &["a".into(), "b".into()]);
        let packed = state.compact_layout(CompactKind::Vertical);
        assert_eq!(packed.iter().find(|i| i.id == "a".into()).unwrap().y, 0.0);
        assert_eq!(packed.iter().find(|i| i.id == "b".into()).unwrap().y, 2.0);
        assert_eq!(state.bottom(), 4.0);
        assert_group_rects(&state);
    }
}
