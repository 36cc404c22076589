#![allow(clippy::float_cmp)]

use super::*;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// PointerKind
// =============================================================

#[test]
fn pointer_kind_from_dom() {
    assert_eq!(PointerKind::from_dom("touch"), PointerKind::Touch);
    assert_eq!(PointerKind::from_dom("pen"), PointerKind::Pen);
    assert_eq!(PointerKind::from_dom("mouse"), PointerKind::Mouse);
    assert_eq!(PointerKind::from_dom(""), PointerKind::Mouse);
}

#[test]
fn only_touch_pinches() {
    assert!(PointerKind::Touch.supports_pinch());
    assert!(!PointerKind::Mouse.supports_pinch());
    assert!(!PointerKind::Pen.supports_pinch());
}

// =============================================================
// Tap threshold
// =============================================================

#[test]
fn movement_below_threshold_is_a_tap() {
    assert!(!exceeds_tap_threshold(pt(10.0, 10.0), pt(13.0, 13.0)));
    assert!(!exceeds_tap_threshold(pt(0.0, 0.0), pt(0.0, 0.0)));
}

#[test]
fn movement_at_threshold_is_a_drag() {
    assert!(exceeds_tap_threshold(pt(0.0, 0.0), pt(3.0, 4.0)));
    assert!(exceeds_tap_threshold(pt(0.0, 0.0), pt(-40.0, 0.0)));
}

// =============================================================
// WheelDelta
// =============================================================

#[test]
fn wheel_up_zooms_in_and_down_zooms_out() {
    assert_eq!(WheelDelta { dx: 0.0, dy: -100.0 }.zoom_factor(), Some(WHEEL_ZOOM_FACTOR));
    assert_eq!(WheelDelta { dx: 0.0, dy: 3.0 }.zoom_factor(), Some(1.0 / WHEEL_ZOOM_FACTOR));
}

#[test]
fn horizontal_only_wheel_does_not_zoom() {
    assert_eq!(WheelDelta { dx: 25.0, dy: 0.0 }.zoom_factor(), None);
}

// =============================================================
// InputState
// =============================================================

#[test]
fn default_state_is_idle() {
    let state = InputState::default();
    assert!(state.is_idle());
    assert!(!state.is_panning());
    assert!(!state.is_pinching());
    assert!(!state.tracks(1));
}

#[test]
fn panning_tracks_its_pointer_only() {
    let state = InputState::Panning {
        pointer: TrackedPointer::new(7, pt(1.0, 1.0)),
        start_screen: pt(1.0, 1.0),
        start_pan: pt(0.0, 0.0),
        dragged: false,
    };
    assert!(state.is_panning());
    assert!(state.tracks(7));
    assert!(!state.tracks(8));
}

#[test]
fn pinching_tracks_both_fingers() {
    let state = InputState::Pinching {
        first: TrackedPointer::new(1, pt(0.0, 0.0)),
        second: TrackedPointer::new(2, pt(10.0, 0.0)),
        start_distance: 10.0,
        start_zoom: 1.0,
    };
    assert!(state.is_pinching());
    assert!(state.tracks(1) && state.tracks(2));
    assert!(!state.tracks(3));
}
