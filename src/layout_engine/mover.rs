//! Single-item coordinate changes.
//!
//! Deliberately does not resolve collisions: intermediate drag frames may
//! overlap the placeholder, and compaction is an explicit separate step.

use crate::model::LayoutItem;

/// Requested position. An absent axis keeps its current value, which is
/// what axis-locked moves rely on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveTo {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl MoveTo {
    pub fn to(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }
}

/// Explicit outcome so callers can distinguish "did nothing" from "moved"
/// without sentinel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Unchanged,
}

/// Move one item. Static items refuse to move unless `force` is set (group
/// translation forces its members). A request matching the current
/// position is a no-op and does not dirty the item.
pub fn move_element(item: &mut LayoutItem, to: MoveTo, force: bool) -> MoveOutcome {
    if item.is_static && !force {
        return MoveOutcome::Unchanged;
    }
    let x = to.x.unwrap_or(item.x);
    let y = to.y.unwrap_or(item.y);
    if x == item.x && y == item.y {
        return MoveOutcome::Unchanged;
    }
    item.x = x;
    item.y = y;
    item.moved = true;
    MoveOutcome::Moved
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn drag_left_by_delta() {
        let mut item = LayoutItem::new("a", 10.0, 10.0, 10.0, 10.0);
        let outcome = move_element(&mut item, MoveTo::to(5.0, 10.0), false);
        assert_eq!(outcome, MoveOutcome::Moved);
        assert_eq!(item.x, 5.0);
        assert_eq!(item.y, 10.0);
        assert!(item.moved);
    }

    #[test]
    fn static_items_never_move_without_force() {
        let mut item = LayoutItem::new("s", 2.0, 3.0, 4.0, 5.0);
        item.is_static = true;
        assert_eq!(move_element(&mut item, MoveTo::to(0.0, 0.0), false), MoveOutcome::Unchanged);
        assert_eq!((item.x, item.y, item.w, item.h), (2.0, 3.0, 4.0, 5.0));
        assert!(!item.moved);

        assert_eq!(move_element(&mut item, MoveTo::to(0.0, 0.0), true), MoveOutcome::Moved);
        assert_eq!((item.x, item.y), (0.0, 0.0));
    }

    #[test]
    fn same_position_is_unchanged() {
        let mut item = LayoutItem::new("a", 1.0, 1.0, 1.0, 1.0);
        assert_eq!(move_element(&mut item, MoveTo::to(1.0, 1.0), false), MoveOutcome::Unchanged);
        assert!(!item.moved);
    }

    #[test]
    fn axis_locked_move_keeps_other_axis() {
        let mut item = LayoutItem::new("a", 3.0, 4.0, 1.0, 1.0);
        let to = MoveTo {
            x: Some(7.0),
            y: None,
        };
        assert_eq!(move_element(&mut item, to, false), MoveOutcome::Moved);
        assert_eq!((item.x, item.y), (7.0, 4.0));
    }
}
