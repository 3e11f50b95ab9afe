//! Pointer event vocabulary consumed by the viewport and stroke session.
//!
//! Hosts translate their native events (winit, browser pointer events,
//! test scripts) into these types; positions are screen/device coordinates,
//! not surface coordinates.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Host-assigned identifier for one contact (mouse, finger, stylus).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerId(pub u64);

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS. Gates wheel zoom.
    pub fn command_like(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { id: PointerId, position: Point },
    Move { id: PointerId, position: Point },
    Up { id: PointerId, position: Point },
    /// Contact lost without a proper release (palm rejection, window leave).
    Cancel { id: PointerId },
}

impl PointerEvent {
    pub fn id(&self) -> PointerId {
        match self {
            PointerEvent::Down { id, .. }
            | PointerEvent::Move { id, .. }
            | PointerEvent::Up { id, .. }
            | PointerEvent::Cancel { id } => *id,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position, .. } => Some(*position),
            PointerEvent::Cancel { .. } => None,
        }
    }
}

/// Wheel/scroll event in screen coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WheelEvent {
    pub position: Point,
    /// Positive = scroll down. Line deltas should be pre-scaled by the host.
    pub delta_y: f64,
    pub modifiers: Modifiers,
}
