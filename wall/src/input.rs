//! Input model: pointer identities and the gesture state machine.
//!
//! This module defines the types consumed by [`crate::engine::EngineCore`].
//! `InputState` is the gesture tracked between pointer-down and pointer-up. It
//! carries everything needed to apply incremental pan and pinch updates and to
//! decide on release whether the gesture was a tap (a click on a brick) or a
//! drag.
//!
//! The tap/drag decision is sticky: once the pointer has travelled
//! [`TAP_THRESHOLD_PX`] from where it went down, the gesture is a drag for the
//! rest of its life, even if the pointer comes back.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::consts::{TAP_THRESHOLD_PX, WHEEL_ZOOM_FACTOR};
use crate::viewport::Point;

/// Browser pointer id (`PointerEvent.pointerId`).
pub type PointerId = i32;

/// Physical pointer type (`PointerEvent.pointerType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    /// Parse the browser's pointer type string. Unknown values count as mouse.
    #[must_use]
    pub fn from_dom(kind: &str) -> Self {
        match kind {
            "touch" => Self::Touch,
            "pen" => Self::Pen,
            _ => Self::Mouse,
        }
    }

    /// Whether a second pointer of this kind can start a pinch.
    #[must_use]
    pub fn supports_pinch(self) -> bool {
        self == Self::Touch
    }
}

/// A pointer being tracked by the current gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPointer {
    pub id: PointerId,
    pub position: Point,
}

impl TrackedPointer {
    #[must_use]
    pub fn new(id: PointerId, position: Point) -> Self {
        Self { id, position }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

impl WheelDelta {
    /// Zoom factor for one wheel notch: in for scroll-up, out for scroll-down.
    ///
    /// `None` when there is no vertical component.
    #[must_use]
    pub fn zoom_factor(self) -> Option<f64> {
        if self.dy < 0.0 {
            Some(WHEEL_ZOOM_FACTOR)
        } else if self.dy > 0.0 {
            Some(1.0 / WHEEL_ZOOM_FACTOR)
        } else {
            None
        }
    }
}

/// Whether the pointer has moved far enough from `start` to count as a drag.
#[must_use]
pub fn exceeds_tap_threshold(start: Point, current: Point) -> bool {
    start.distance(current) >= TAP_THRESHOLD_PX
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Copy, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// One pointer is down and dragging the wall.
    Panning {
        /// The pointer driving the pan.
        pointer: TrackedPointer,
        /// Screen position where the gesture started.
        start_screen: Point,
        /// Pan offset when the gesture started.
        start_pan: Point,
        /// Set once the pointer crosses the tap threshold; never cleared.
        dragged: bool,
    },
    /// Two touch pointers are down and zooming around their midpoint.
    Pinching {
        first: TrackedPointer,
        second: TrackedPointer,
        /// Finger distance when the pinch started.
        start_distance: f64,
        /// Zoom when the pinch started.
        start_zoom: f64,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub fn is_panning(&self) -> bool {
        matches!(self, Self::Panning { .. })
    }

    #[must_use]
    pub fn is_pinching(&self) -> bool {
        matches!(self, Self::Pinching { .. })
    }

    /// Whether `id` takes part in the current gesture.
    #[must_use]
    pub fn tracks(&self, id: PointerId) -> bool {
        match self {
            Self::Idle => false,
            Self::Panning { pointer, .. } => pointer.id == id,
            Self::Pinching { first, second, .. } => first.id == id || second.id == id,
        }
    }
}
