//! Small layout queries and paint-order adjustments.

use crate::model::LayoutItem;

/// Lowest edge of the layout, in grid rows. Empty layouts have bottom 0.
pub fn bottom(layout: &[LayoutItem]) -> f64 {
    layout.iter().map(LayoutItem::bottom).fold(0.0, f64::max)
}

/// Deep equality over two item lists, matched by id. Order does not
/// matter; extra or missing ids do. The transient `moved` and
/// `placeholder` flags are ignored, so a session that only re-parents or
/// re-levels items still counts as a change.
pub fn layout_equal(a: &[LayoutItem], b: &[LayoutItem]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|item| {
        b.iter().any(|other| other.id == item.id && persistent_eq(item, other))
    })
}

fn persistent_eq(a: &LayoutItem, b: &LayoutItem) -> bool {
    let strip = |item: &LayoutItem| {
        let mut out = item.clone();
        out.moved = false;
        out.placeholder = false;
        out
    };
    strip(a) == strip(b)
}

/// Raise an item one paint level. Unset z counts as 1.
pub fn bring_forward(item: &mut LayoutItem) {
    item.z = Some(item.z.unwrap_or(1) + 1);
}

/// Lower an item one paint level, not below 1.
pub fn bring_back(item: &mut LayoutItem) {
    item.z = Some((item.z.unwrap_or(1) - 1).max(1));
}

/// Paint above every level currently in use.
pub fn bring_top(item: &mut LayoutItem, max_z: i32) {
    item.z = Some(max_z + 1);
}

/// Paint below everything.
pub fn bring_bottom(item: &mut LayoutItem) {
    item.z = Some(1);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn bottom_of_empty_layout_is_zero() {
        assert_eq!(bottom(&[]), 0.0);
        let layout = vec![
            LayoutItem::new("a", 0.0, 2.0, 1.0, 3.0),
            LayoutItem::new("b", 0.0, 0.0, 1.0, 1.0),
        ];
        assert_eq!(bottom(&layout), 5.0);
    }

    #[test]
    fn layout_equal_ignores_order() {
        let a = vec![
            LayoutItem::new("a", 0.0, 0.0, 1.0, 1.0),
            LayoutItem::new("b", 2.0, 0.0, 1.0, 1.0),
        ];
        let b = vec![a[1].clone(), a[0].clone()];
        assert!(layout_equal(&a, &b));

        let mut c = b.clone();
        c[0].x = 9.0;
        assert!(!layout_equal(&a, &c));
        assert!(!layout_equal(&a, &a[..1]));
    }

    #[test]
    fn layout_equal_is_deep_but_ignores_transient_flags() {
        use crate::model::ItemId;

        let a = vec![LayoutItem::new("a", 0.0, 0.0, 1.0, 1.0)];

        // Re-parenting alone is a real change.
        let mut reparented = a.clone();
        reparented[0].parent = Some(ItemId::real("g"));
        assert!(!layout_equal(&a, &reparented));

        // A paint-level change is too.
        let mut leveled = a.clone();
        leveled[0].z = Some(3);
        assert!(!layout_equal(&a, &leveled));

        // Dirty-tracking flags are not.
        let mut dirtied = a.clone();
        dirtied[0].moved = true;
        dirtied[0].placeholder = true;
        assert!(layout_equal(&a, &dirtied));
    }

    #[test]
    fn z_adjustments_floor_at_one() {
        let mut item = LayoutItem::new("a", 0.0, 0.0, 1.0, 1.0);
        bring_back(&mut item);
        assert_eq!(item.z, Some(1));
        bring_forward(&mut item);
        assert_eq!(item.z, Some(2));
        bring_top(&mut item, 7);
        assert_eq!(item.z, Some(8));
        bring_bottom(&mut item);
        assert_eq!(item.z, Some(1));
    }
}
