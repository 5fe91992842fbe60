//! Session engine: normalized gesture and selection events in, state
//! transitions and per-event responses out.
//!
//! The caller delivers events in gesture order (start, zero or more moves,
//! stop); the engine never reorders. A stop always commits the final
//! position, and the committed layout is reported at most once per session.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::config::GridConfig;
use crate::layout_engine::error::LayoutError;
use crate::layout_engine::state::{
    ChildSlot, LayoutState, MoveRequest, RenderNode, ResizeRequest,
};
use crate::layout_engine::utils;
use crate::model::{GridRect, ItemId, LayoutItem};

/// Normalized input event. Coordinates and deltas are grid units; the
/// gesture layer owns the pixel mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum LayoutEvent {
    SessionStart { id: ItemId },
    SessionMove { id: ItemId, dx: f64, dy: f64 },
    SessionStop { id: ItemId, x: f64, y: f64 },
    ResizeStart { id: ItemId },
    Resize { id: ItemId, frame: GridRect },
    ResizeStop { id: ItemId, frame: GridRect },
    SelectionStart,
    Selection { rect: GridRect },
    SelectionEnd,
}

/// Out-of-band operations with no gesture session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "command")]
pub enum LayoutCommand {
    /// Repack along the configured axis.
    Compact,
    AddGroup { id: ItemId, members: Vec<ItemId> },
    DeleteGroup { id: ItemId },
    BringForward { id: ItemId },
    BringBack { id: ItemId },
    BringTop { id: ItemId },
    BringBottom { id: ItemId },
}

/// What one event produced. `layout_changed` carries the committed layout
/// when a session changed it; `selection` carries the hoisted selection
/// when one ended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    pub layout_changed: Option<Vec<LayoutItem>>,
    pub selection: Option<Vec<LayoutItem>>,
}

impl EventResponse {
    fn changed(layout: Vec<LayoutItem>) -> Self {
        Self {
            layout_changed: Some(layout),
            ..Self::default()
        }
    }
}

/// The engine: configuration plus the layout state machine it drives.
#[derive(Debug)]
pub struct GridEngine {
    config: GridConfig,
    state: LayoutState,
}

impl GridEngine {
    pub fn new(config: GridConfig) -> Self {
        let state = LayoutState::new(config.cols());
        Self { config, state }
    }

    pub fn config(&self) -> &GridConfig { &self.config }

    pub fn state(&self) -> &LayoutState { &self.state }

    pub fn state_mut(&mut self) -> &mut LayoutState { &mut self.state }

    /// Reconcile against the declared children. Must run before the first
    /// event or render query.
    pub fn synchronize(&mut self, children: &[ChildSlot]) {
        self.state.synchronize_layout_with_children(children);
    }

    pub fn children(&self) -> Result<Vec<RenderNode>, LayoutError> { self.state.children() }

    pub fn handle_event(&mut self, event: LayoutEvent) -> EventResponse {
        match event {
            LayoutEvent::SessionStart { id } => {
                if !self.draggable(&id) {
                    return EventResponse::default();
                }
                let target = self.session_target(&id);
                self.state.start_drag(&target);
                EventResponse::default()
            }
            LayoutEvent::SessionMove { id, dx, dy } => {
                if !self.draggable(&id) {
                    return EventResponse::default();
                }
                let target = self.session_target(&id);
                let Some((cx, cy)) = self.target_origin(&target) else {
                    warn!(%id, "move for unknown session target");
                    return EventResponse::default();
                };
                self.state.move_item(
                    &target,
                    MoveRequest {
                        x: Some(cx + dx),
                        y: Some(cy + dy),
                        dx,
                        dy,
                    },
                    true,
                );
                self.state.drag();
                EventResponse::default()
            }
            LayoutEvent::SessionStop { id, x, y } => {
                if !self.draggable(&id) {
                    return EventResponse::default();
                }
                let target = self.session_target(&id);
                // The final position is the gestured entity's, so the
                // commit delta must come from its own origin; the group
                // frame sits elsewhere when a member is dragged.
                if let Some((cx, cy)) = self.target_origin(&id) {
                    self.state.move_item(
                        &target,
                        MoveRequest {
                            x: Some(x),
                            y: Some(y),
                            dx: x - cx,
                            dy: y - cy,
                        },
                        true,
                    );
                }
                match self.state.end_drag() {
                    Some(layout) => EventResponse::changed(layout),
                    None => EventResponse::default(),
                }
            }
            LayoutEvent::ResizeStart { id } => {
                if !self.resizable(&id) {
                    return EventResponse::default();
                }
                self.state.start_resize(&id);
                EventResponse::default()
            }
            LayoutEvent::Resize { id, frame } => {
                if !self.resizable(&id) {
                    return EventResponse::default();
                }
                self.state.resize_item(&id, resize_request(frame));
                EventResponse::default()
            }
            LayoutEvent::ResizeStop { id, frame } => {
                if !self.resizable(&id) {
                    return EventResponse::default();
                }
                self.state.resize_item(&id, resize_request(frame));
                match self.state.end_resize(&id) {
                    Some(layout) => EventResponse::changed(layout),
                    None => EventResponse::default(),
                }
            }
            LayoutEvent::SelectionStart => {
                self.state.start_selection();
                EventResponse::default()
            }
            LayoutEvent::Selection { rect } => {
                self.state.select_by_rect(rect);
                EventResponse::default()
            }
            LayoutEvent::SelectionEnd => {
                let selection = self.state.end_selection();
                EventResponse {
                    selection: Some(selection),
                    ..EventResponse::default()
                }
            }
        }
    }

    pub fn handle_command(&mut self, command: LayoutCommand) -> EventResponse {
        match command {
            LayoutCommand::Compact => {
                let packed = self.state.compact_layout(self.config.compact);
                debug!(kind = %self.config.compact, "compacted by command");
                EventResponse::changed(packed)
            }
            LayoutCommand::AddGroup { id, members } => {
                self.state.add_group(id, &members);
                EventResponse::default()
            }
            LayoutCommand::DeleteGroup { id } => {
                self.state.delete_group(&id);
                EventResponse::default()
            }
            LayoutCommand::BringForward { id } => {
                self.state.update_item(&id, utils::bring_forward);
                EventResponse::default()
            }
            LayoutCommand::BringBack { id } => {
                self.state.update_item(&id, utils::bring_back);
                EventResponse::default()
            }
            LayoutCommand::BringTop { id } => {
                let max = self.state.max_level();
                self.state.update_item(&id, |item| utils::bring_top(item, max));
                EventResponse::default()
            }
            LayoutCommand::BringBottom { id } => {
                self.state.update_item(&id, utils::bring_bottom);
                EventResponse::default()
            }
        }
    }

    /// A member of a group drags its whole group; everything else drags
    /// itself.
    fn session_target(&self, id: &ItemId) -> ItemId {
        if self.state.groups().contains_key(id) {
            return id.clone();
        }
        self.state
            .item(id)
            .and_then(|item| item.parent.clone())
            .unwrap_or_else(|| id.clone())
    }

    fn target_origin(&self, target: &ItemId) -> Option<(f64, f64)> {
        if let Some(group) = self.state.groups().get(target) {
            return Some((group.rect.x, group.rect.y));
        }
        self.state.item(target).map(|item| (item.x, item.y))
    }

    fn draggable(&self, id: &ItemId) -> bool {
        self.state
            .item(id)
            .map(|item| !item.is_static && item.is_draggable.unwrap_or(self.config.draggable))
            .unwrap_or(true)
    }

    fn resizable(&self, id: &ItemId) -> bool {
        self.state
            .item(id)
            .map(|item| !item.is_static && item.is_resizable.unwrap_or(self.config.resizable))
            .unwrap_or(true)
    }
}

fn resize_request(frame: GridRect) -> ResizeRequest {
    ResizeRequest {
        x: frame.x,
        y: frame.y,
        w: frame.width(),
        h: frame.height(),
    }
}
