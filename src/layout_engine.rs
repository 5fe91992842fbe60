pub mod collision;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod grouping;
pub mod mover;
pub mod state;
pub mod utils;

pub use collision::{CompactKind, collides, compact, correct_bounds, first_collision};
pub use engine::{EventResponse, GridEngine, LayoutCommand, LayoutEvent};
pub use error::LayoutError;
pub use geometry::{Padding, PixelPoint, Position};
pub use grouping::{PickOption, StretchParams};
pub use mover::{MoveOutcome, MoveTo};
pub use state::{ChildSlot, LayoutState, MoveRequest, RenderNode, ResizeRequest};
