//! Group construction, dissolution, selection hoisting, layout merging and
//! frame-driven stretching.

use tracing::trace;

use crate::model::item::{GridRect, ItemId, LayoutItem, UNSET_LEVEL};
use crate::model::{Group, Groups};

/// Form a group over `items`: every member is stamped with the group as
/// both current and saved parent, member z values feed the group's level
/// list, and the bounding rect is cached.
pub fn group_layout(items: &[LayoutItem], id: &ItemId) -> Group {
    let mut level = Vec::new();
    let layout: Vec<LayoutItem> = items
        .iter()
        .map(|item| {
            if let Some(z) = item.z
                && z != UNSET_LEVEL
            {
                level.push(z);
            }
            let mut member = item.clone();
            member.parent = Some(id.clone());
            member.prev_parent = Some(id.clone());
            member
        })
        .collect();
    let rect = GridRect::bounding(&layout);
    Group {
        id: id.clone(),
        layout,
        rect,
        level,
    }
}

/// Dissolve a grouping: strip `parent` from every item, keeping
/// `prev_parent` so a later re-selection can recall the old membership.
pub fn split_group(items: &[LayoutItem]) -> Vec<LayoutItem> {
    items
        .iter()
        .map(|item| {
            let mut out = item.clone();
            out.parent = None;
            out
        })
        .collect()
}

/// Selecting one member of a group selects the whole group: every selected
/// item's group is substituted by its full membership; ungrouped items pass
/// through unchanged. Groups missing from the map contribute nothing.
pub fn hoist_selection_by_parent(selected: &[LayoutItem], groups: &Groups) -> Vec<LayoutItem> {
    let mut parents: Vec<&ItemId> = Vec::new();
    let mut singles: Vec<LayoutItem> = Vec::new();

    for item in selected {
        match &item.parent {
            Some(parent) => {
                if !parents.contains(&parent) {
                    parents.push(parent);
                }
            }
            None => singles.push(item.clone()),
        }
    }

    if parents.is_empty() {
        return selected.to_vec();
    }

    let mut hoisted = Vec::new();
    for parent in parents {
        if let Some(group) = groups.get(parent) {
            hoisted.extend(group.layout.iter().cloned());
        }
    }
    hoisted.extend(singles);
    hoisted
}

/// Fold `patch` into `layout` in place: matched ids are overwritten where
/// they stand (patch wins), unmatched patch items append. The single point
/// through which partial updates rejoin a member list.
pub fn merge_layout(layout: &mut Vec<LayoutItem>, patch: &[LayoutItem]) {
    merge_layout_with(layout, patch, |_| {});
}

/// [`merge_layout`] with a hook applied to every matched item after the
/// overwrite.
pub fn merge_layout_with(
    layout: &mut Vec<LayoutItem>,
    patch: &[LayoutItem],
    mut apply: impl FnMut(&mut LayoutItem),
) {
    for incoming in patch {
        match layout.iter_mut().find(|item| item.id == incoming.id) {
            Some(slot) => {
                *slot = incoming.clone();
                apply(slot);
            }
            None => layout.push(incoming.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StretchParams {
    /// Scale size on every axis regardless of per-item opt-outs.
    pub strict: bool,
}

/// Rescale `items` so their collective bounding box becomes `target`.
///
/// Positions always translate proportionally. Sizes scale only on the axes
/// an item opted into (`stretch`), so a pinned item rides along without
/// deforming. The group frame follows the grid; member interiors keep
/// their proportions and may land between cells.
pub fn stretch_layout(items: &[LayoutItem], target: GridRect, params: StretchParams) -> Vec<LayoutItem> {
    if items.is_empty() {
        return Vec::new();
    }

    let origin = GridRect::bounding(items);
    let sx = scale_factor(origin.width(), target.width());
    let sy = scale_factor(origin.height(), target.height());

    items
        .iter()
        .map(|item| {
            let mut out = item.clone();
            out.x = (item.x - origin.x) * sx + target.x;
            out.y = (item.y - origin.y) * sy + target.y;
            if params.strict || item.stretch.horizontal() {
                out.w = item.w * sx;
            }
            if params.strict || item.stretch.vertical() {
                out.h = item.h * sy;
            }
            out
        })
        .collect()
}

fn scale_factor(from: f64, to: f64) -> f64 {
    if from > 0.0 { to / from } else { 1.0 }
}

/// Snap items back onto a frame: each item exactly fills `restrict` on the
/// axes it opted into. Used when a stretched member's own resize session
/// ends and it must re-cover its parent.
pub fn auto_fit(items: &[LayoutItem], restrict: GridRect) -> Vec<LayoutItem> {
    items
        .iter()
        .map(|item| {
            let mut out = item.clone();
            if item.stretch.horizontal() {
                out.x = restrict.x;
                out.w = restrict.width();
            }
            if item.stretch.vertical() {
                out.y = restrict.y;
                out.h = restrict.height();
            }
            out
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickOption {
    /// Any intersection counts.
    #[default]
    Contain,
    /// Only items fully inside the rect count.
    Include,
}

/// Items selected by a rectangular sweep.
pub fn pick_by_rect(layout: &[LayoutItem], rect: GridRect, option: PickOption) -> Vec<LayoutItem> {
    let picked: Vec<LayoutItem> = layout
        .iter()
        .filter(|item| match option {
            PickOption::Include => {
                rect.x < item.x
                    && rect.y < item.y
                    && rect.right > item.right()
                    && rect.bottom > item.bottom()
            }
            PickOption::Contain => {
                rect.x < item.right()
                    && rect.y < item.bottom()
                    && rect.right > item.x
                    && rect.bottom > item.y
            }
        })
        .cloned()
        .collect();
    trace!(count = picked.len(), "picked items by rect");
    picked
}
