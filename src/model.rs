pub mod arena;
pub mod group;
pub mod item;

pub use arena::{ItemKey, LayoutArena};
pub use group::{Group, Groups};
pub use item::{GridRect, ItemId, LayoutItem, StretchAxes, TOP_LEVEL, UNSET_LEVEL};
