use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Paint level used when an item carries no explicit `z`. Items at this
/// level render below everything that set one.
pub const UNSET_LEVEL: i32 = i32::MIN;

/// Paint level for transient ghosts (drag/resize placeholders).
pub const TOP_LEVEL: i32 = 999;

/// Stable identifier for an item or a group.
///
/// `Real` ids are consumer-assigned and safe to persist. `Synthetic` ids are
/// allocated by the engine for transient entities (temporary selection
/// groups, placeholder ghosts) and must never outlive the state that minted
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemId {
    Real(String),
    Synthetic(u64),
}

static NEXT_SYNTHETIC: AtomicU64 = AtomicU64::new(1);

impl ItemId {
    pub fn real(id: impl Into<String>) -> Self { ItemId::Real(id.into()) }

    /// Mint a fresh transient id. Ids are unique for the process lifetime.
    pub fn synthetic() -> Self {
        ItemId::Synthetic(NEXT_SYNTHETIC.fetch_add(1, Ordering::Relaxed))
    }

    pub fn is_synthetic(&self) -> bool { matches!(self, ItemId::Synthetic(_)) }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self { ItemId::Real(value.to_owned()) }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self { ItemId::Real(value) }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Real(s) => f.write_str(s),
            ItemId::Synthetic(n) => write!(f, "#{n}"),
        }
    }
}

/// Which axes of an item follow a group-frame stretch.
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
pub enum StretchAxes {
    #[default]
    None,
    X,
    Y,
    Both,
}

impl StretchAxes {
    pub fn horizontal(self) -> bool { matches!(self, StretchAxes::X | StretchAxes::Both) }

    pub fn vertical(self) -> bool { matches!(self, StretchAxes::Y | StretchAxes::Both) }
}

/// One placed rectangle.
///
/// Coordinates are grid units. User placements stay on whole cells; group
/// stretch deliberately produces fractional member geometry (the group frame
/// follows the grid, its interior keeps proportions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutItem {
    pub id: ItemId,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<f64>,
    /// Immovable and unresizable; only an authoritative relayout may touch
    /// its geometry.
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Dirty flag set by the last move operation, cleared by compaction.
    #[serde(default)]
    pub moved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_draggable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_resizable: Option<bool>,
    /// Transient ghost shown during a drag/resize session.
    #[serde(default)]
    pub placeholder: bool,
    /// Group containing this item, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ItemId>,
    /// Previous parent, kept so a dissolved grouping can be restored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_parent: Option<ItemId>,
    #[serde(default)]
    pub stretch: StretchAxes,
}

impl LayoutItem {
    pub fn new(id: impl Into<ItemId>, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w,
            h,
            z: None,
            min_w: None,
            min_h: None,
            max_w: None,
            max_h: None,
            is_static: false,
            moved: false,
            is_draggable: None,
            is_resizable: None,
            placeholder: false,
            parent: None,
            prev_parent: None,
            stretch: StretchAxes::None,
        }
    }

    pub fn right(&self) -> f64 { self.x + self.w }

    pub fn bottom(&self) -> f64 { self.y + self.h }

    pub fn level(&self) -> i32 { self.z.unwrap_or(UNSET_LEVEL) }

    pub fn rect(&self) -> GridRect {
        GridRect {
            x: self.x,
            y: self.y,
            right: self.right(),
            bottom: self.bottom(),
        }
    }

    /// Transient copy of this item's frame, painted on top of everything.
    pub fn ghost(&self, id: ItemId) -> LayoutItem {
        let mut ghost = LayoutItem::new(id, self.x, self.y, self.w, self.h);
        ghost.placeholder = true;
        ghost.z = Some(TOP_LEVEL);
        ghost
    }
}

/// Axis-aligned rectangle in grid units. Pure value, no identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridRect {
    pub x: f64,
    pub y: f64,
    pub right: f64,
    pub bottom: f64,
}

impl GridRect {
    pub fn new(x: f64, y: f64, right: f64, bottom: f64) -> Self {
        Self { x, y, right, bottom }
    }

    pub fn from_size(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            right: x + w,
            bottom: y + h,
        }
    }

    pub fn width(&self) -> f64 { self.right - self.x }

    pub fn height(&self) -> f64 { self.bottom - self.y }

    /// Bounding box of a member list. Empty input yields an inverted
    /// infinite rect, matching the fold identity.
    pub fn bounding(items: &[LayoutItem]) -> GridRect {
        let mut rect = GridRect {
            x: f64::INFINITY,
            y: f64::INFINITY,
            right: f64::NEG_INFINITY,
            bottom: f64::NEG_INFINITY,
        };
        for item in items {
            rect.x = rect.x.min(item.x);
            rect.y = rect.y.min(item.y);
            rect.right = rect.right.max(item.right());
            rect.bottom = rect.bottom.max(item.bottom());
        }
        rect
    }
}
