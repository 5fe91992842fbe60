//! Overlap detection and layout compaction.
//!
//! Compaction packs non-static items toward the origin of one axis and
//! resolves any residual overlap with a worklist: the item being placed is
//! moved past each colliding neighbor by that neighbor's extent until it is
//! collision-free. Deterministic for a fixed input ordering; ties in the
//! sort break by original index.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::model::LayoutItem;

/// Packing axis.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CompactKind {
    #[default]
    Vertical,
    Horizontal,
}

/// AABB overlap. An item never collides with itself.
pub fn collides(a: &LayoutItem, b: &LayoutItem) -> bool {
    if a.id == b.id {
        return false;
    }
    if a.x + a.w <= b.x {
        return false;
    }
    if a.x >= b.x + b.w {
        return false;
    }
    if a.y + a.h <= b.y {
        return false;
    }
    if a.y >= b.y + b.h {
        return false;
    }
    true
}

/// First item in list order overlapping `item`.
pub fn first_collision<'a>(layout: &'a [LayoutItem], item: &LayoutItem) -> Option<&'a LayoutItem> {
    layout.iter().find(|other| collides(other, item))
}

fn first_hit(layout: &[LayoutItem], placed: &[usize], target: usize) -> Option<usize> {
    placed.iter().copied().find(|&j| collides(&layout[j], &layout[target]))
}

/// Clamp every item into `[0, cols)` horizontally. Statics resolve their
/// overlaps among themselves, later index yields: a static colliding with
/// an earlier static is pushed down along `y` only — never sideways, not
/// even during horizontal compaction.
pub fn correct_bounds(layout: &mut [LayoutItem], cols: f64) {
    let mut placed_statics: Vec<usize> = Vec::new();
    for i in 0..layout.len() {
        if layout[i].x + layout[i].w > cols {
            layout[i].x = cols - layout[i].w;
        }
        if layout[i].x < 0.0 {
            layout[i].x = 0.0;
            layout[i].w = cols;
        }
        if layout[i].is_static {
            while first_hit(layout, &placed_statics, i).is_some() {
                layout[i].y += 1.0;
            }
            placed_statics.push(i);
        }
    }
}

/// Repack a layout along one axis. Statics are seeded as obstacles and keep
/// their place; every other item is pulled toward the packing origin and
/// then moved past whatever it still overlaps. The `moved` flag is cleared
/// on every item in the output.
pub fn compact(layout: &[LayoutItem], kind: CompactKind, cols: f64) -> Vec<LayoutItem> {
    let mut out: Vec<LayoutItem> = layout.to_vec();
    correct_bounds(&mut out, cols);

    let mut order: Vec<usize> = (0..out.len()).collect();
    order.sort_by(|&a, &b| {
        let (pa, pb) = (&out[a], &out[b]);
        let key = match kind {
            CompactKind::Vertical => (pa.y, pa.x).partial_cmp(&(pb.y, pb.x)),
            CompactKind::Horizontal => (pa.x, pa.y).partial_cmp(&(pb.x, pb.y)),
        };
        key.unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(&b))
    });

    // Statics act as obstacles from the start, in original order.
    let mut placed: Vec<usize> =
        out.iter().enumerate().filter(|(_, l)| l.is_static).map(|(i, _)| i).collect();

    for &i in &order {
        if out[i].is_static {
            continue;
        }

        // Alternate between pulling toward the origin and stepping past
        // one collision until the item sits still. Interleaving keeps the
        // result a fixpoint of compaction.
        loop {
            // Pull toward the origin while nothing is in the way.
            loop {
                let current = match kind {
                    CompactKind::Vertical => out[i].y,
                    CompactKind::Horizontal => out[i].x,
                };
                if current <= 0.0 {
                    break;
                }
                let next = (current - 1.0).max(0.0);
                set_axis(&mut out[i], kind, next);
                if first_hit(&out, &placed, i).is_some() {
                    set_axis(&mut out[i], kind, current);
                    break;
                }
            }

            let Some(j) = first_hit(&out, &placed, i) else { break };
            let past = match kind {
                CompactKind::Vertical => out[j].y + out[j].h,
                CompactKind::Horizontal => out[j].x + out[j].w,
            };
            set_axis(&mut out[i], kind, past);
            if kind == CompactKind::Horizontal && out[i].x + out[i].w > cols {
                // Ran off the right edge; wrap to the next row and retry.
                out[i].x = cols - out[i].w;
                out[i].y += 1.0;
            }
        }

        placed.push(i);
    }

    for item in &mut out {
        item.moved = false;
    }
    trace!(items = out.len(), %kind, "compacted layout");
    out
}

fn set_axis(item: &mut LayoutItem, kind: CompactKind, value: f64) {
    match kind {
        CompactKind::Vertical => item.y = value,
        CompactKind::Horizontal => item.x = value,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn item(id: &str, x: f64, y: f64, w: f64, h: f64) -> LayoutItem {
        LayoutItem::new(id, x, y, w, h)
    }

    fn static_item(id: &str, x: f64, y: f64, w: f64, h: f64) -> LayoutItem {
        let mut l = item(id, x, y, w, h);
        l.is_static = true;
        l
    }

    fn by_id<'a>(layout: &'a [LayoutItem], id: &str) -> &'a LayoutItem {
        layout.iter().find(|l| l.id == id.into()).unwrap()
    }

    fn assert_packed(layout: &[LayoutItem], cols: f64) {
        for a in layout {
            for b in layout {
                if a.id != b.id && !a.is_static && !b.is_static {
                    assert!(!collides(a, b), "{} overlaps {}", a.id, b.id);
                }
            }
            assert!(a.x >= 0.0 && a.x + a.w <= cols, "{} out of bounds", a.id);
            assert!(!a.moved);
        }
    }

    #[test]
    fn collides_is_aabb_and_never_self() {
        let a = item("a", 0.0, 0.0, 2.0, 2.0);
        let b = item("b", 1.0, 1.0, 2.0, 2.0);
        let c = item("c", 2.0, 0.0, 2.0, 2.0);
        assert!(collides(&a, &b));
        assert!(!collides(&a, &c)); // touching edges do not overlap
        assert!(!collides(&a, &a));
    }

    #[test]
    fn first_collision_respects_list_order() {
        let layout = vec![item("a", 0.0, 0.0, 2.0, 2.0), item("b", 1.0, 0.0, 2.0, 2.0)];
        let probe = item("p", 1.0, 1.0, 2.0, 2.0);
        assert_eq!(first_collision(&layout, &probe).unwrap().id, "a".into());
    }

    #[test]
    fn fully_overlapping_pair_stacks_by_original_index() {
        let layout = vec![item("a", 0.0, 0.0, 10.0, 10.0), item("b", 0.0, 0.0, 10.0, 10.0)];
        let out = compact(&layout, CompactKind::Vertical, 10.0);
        assert_eq!(by_id(&out, "a").y, 0.0);
        assert_eq!(by_id(&out, "b").y, 10.0);
        assert_packed(&out, 10.0);
    }

    #[test]
    fn vertical_compact_closes_gaps() {
        let layout = vec![
            item("a", 0.0, 4.0, 2.0, 2.0),
            item("b", 0.0, 9.0, 2.0, 2.0),
            item("c", 3.0, 7.0, 2.0, 2.0),
        ];
        let out = compact(&layout, CompactKind::Vertical, 12.0);
        assert_eq!(by_id(&out, "a").y, 0.0);
        assert_eq!(by_id(&out, "b").y, 2.0);
        assert_eq!(by_id(&out, "c").y, 0.0);
        assert_packed(&out, 12.0);
    }

    #[test]
    fn horizontal_compact_packs_leftward() {
        let layout = vec![item("a", 5.0, 0.0, 2.0, 2.0), item("b", 9.0, 0.0, 2.0, 2.0)];
        let out = compact(&layout, CompactKind::Horizontal, 12.0);
        assert_eq!(by_id(&out, "a").x, 0.0);
        assert_eq!(by_id(&out, "b").x, 2.0);
        assert_packed(&out, 12.0);
    }

    #[test]
    fn statics_are_immovable_obstacles() {
        let layout = vec![static_item("s", 0.0, 2.0, 4.0, 2.0), item("a", 0.0, 8.0, 4.0, 2.0)];
        let out = compact(&layout, CompactKind::Vertical, 12.0);
        assert_eq!(by_id(&out, "s").y, 2.0);
        // The stepwise pull stops "a" against the static; it never jumps
        // the obstacle into the gap above.
        assert_eq!(by_id(&out, "a").y, 4.0);

        let layout = vec![static_item("s", 0.0, 0.0, 4.0, 4.0), item("a", 1.0, 1.0, 2.0, 2.0)];
        let out = compact(&layout, CompactKind::Vertical, 12.0);
        assert_eq!(by_id(&out, "a").y, 4.0); // pushed below the static
    }

    #[test]
    fn overlapping_statics_resolve_down_y_even_horizontally() {
        let layout = vec![static_item("s1", 0.0, 0.0, 2.0, 2.0), static_item("s2", 0.0, 0.0, 2.0, 2.0)];
        for kind in [CompactKind::Vertical, CompactKind::Horizontal] {
            let out = compact(&layout, kind, 12.0);
            assert_eq!(by_id(&out, "s1").x, 0.0);
            assert_eq!(by_id(&out, "s1").y, 0.0);
            assert_eq!(by_id(&out, "s2").x, 0.0, "statics never move sideways");
            assert_eq!(by_id(&out, "s2").y, 2.0);
        }
    }

    #[test]
    fn correct_bounds_clamps_overflow() {
        let mut layout = vec![item("a", 11.0, 0.0, 4.0, 2.0), item("b", -2.0, 0.0, 3.0, 2.0)];
        correct_bounds(&mut layout, 12.0);
        assert_eq!(by_id(&layout, "a").x, 8.0);
        assert_eq!(by_id(&layout, "b").x, 0.0);
        assert_eq!(by_id(&layout, "b").w, 12.0);
    }

    #[test]
    fn correct_bounds_pushes_later_static_down() {
        let mut layout = vec![
            static_item("s1", 0.0, 0.0, 2.0, 2.0),
            static_item("s2", 0.0, 1.0, 2.0, 2.0),
            static_item("s3", 0.0, 0.0, 2.0, 1.0),
        ];
        correct_bounds(&mut layout, 12.0);
        // Earlier index holds its ground; each later static steps past
        // everything already settled.
        assert_eq!(by_id(&layout, "s1").y, 0.0);
        assert_eq!(by_id(&layout, "s2").y, 2.0);
        assert_eq!(by_id(&layout, "s3").y, 4.0);
    }

    #[test]
    fn horizontal_compact_wraps_at_right_edge() {
        let layout = vec![
            item("a", 0.0, 0.0, 5.0, 2.0),
            item("b", 5.0, 0.0, 5.0, 2.0),
            item("c", 0.0, 0.0, 5.0, 2.0),
        ];
        let out = compact(&layout, CompactKind::Horizontal, 10.0);
        assert_packed(&out, 10.0);
        assert_eq!(by_id(&out, "a").x, 0.0);
        assert_eq!(by_id(&out, "c").x, 5.0);
        // "b" found no room on the first row, wrapped, then packed left.
        assert_eq!((by_id(&out, "b").x, by_id(&out, "b").y), (0.0, 2.0));
    }

    #[test]
    fn compaction_is_idempotent() {
        let layout = vec![
            item("a", 3.0, 7.0, 2.0, 2.0),
            item("b", 0.0, 0.0, 4.0, 3.0),
            static_item("s", 2.0, 3.0, 3.0, 2.0),
            item("c", 6.0, 9.0, 2.0, 5.0),
            item("d", 1.0, 2.0, 2.0, 2.0),
        ];
        for kind in [CompactKind::Vertical, CompactKind::Horizontal] {
            let once = compact(&layout, kind, 12.0);
            let twice = compact(&once, kind, 12.0);
            assert_eq!(once, twice);
            assert_packed(&once, 12.0);
        }
    }

    #[test]
    fn moved_flag_cleared_on_all_items() {
        let mut a = item("a", 0.0, 5.0, 2.0, 2.0);
        a.moved = true;
        let mut b = item("b", 0.0, 0.0, 2.0, 2.0);
        b.moved = true;
        let out = compact(&[a, b], CompactKind::Vertical, 12.0);
        assert!(out.iter().all(|l| !l.moved));
    }
}
