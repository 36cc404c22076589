//! Shared numeric and color constants for the wall crate.

// ── Geometry ────────────────────────────────────────────────────

/// Edge length of one brick in CSS pixels at zoom 1.0.
pub const BASE_CELL_SIZE_PX: f64 = 16.0;

/// Upper zoom bound. At the base cell size this gives 64 px bricks.
pub const MAX_ZOOM: f64 = 4.0;

/// Lower zoom bound used when the container has no measurable size yet.
pub const FALLBACK_MIN_ZOOM: f64 = 0.05;

/// Zoom applied on first mount and on an explicit reset.
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Multiplicative step for the on-screen zoom buttons.
pub const ZOOM_BUTTON_FACTOR: f64 = 1.25;

/// Multiplicative step for one wheel notch.
pub const WHEEL_ZOOM_FACTOR: f64 = 1.1;

// ── Input ───────────────────────────────────────────────────────

/// Pointer travel (CSS pixels) at which a press stops being a tap.
pub const TAP_THRESHOLD_PX: f64 = 5.0;

/// Smallest finger spread used as the pinch baseline, to avoid dividing by ~0.
pub const MIN_PINCH_DISTANCE_PX: f64 = 1.0;

// ── Rendering ───────────────────────────────────────────────────

/// Grid lines are skipped entirely below this cell size.
pub const GRID_LINE_MIN_CELL_PX: f64 = 4.0;

/// Inset applied to filled bricks so grid lines stay visible between neighbours.
pub const SOLD_CELL_INSET_PX: f64 = 1.0;

/// Page background behind the wall.
pub const BACKGROUND_COLOR: &str = "#CDE6F5";

/// Fill for the addressable wall area.
pub const WALL_COLOR: &str = "#E4F1FA";

/// Grid line stroke.
pub const GRID_LINE_COLOR: &str = "rgba(0,0,0,0.06)";

/// Grid line width in CSS pixels.
pub const GRID_LINE_WIDTH_PX: f64 = 1.0;

/// Fill used for a sold brick whose record carries no color.
pub const DEFAULT_BRICK_COLOR: &str = "#FFD352";

/// Outline color for the current user's bricks.
pub const OWNED_HIGHLIGHT_COLOR: &str = "#22C55E";

/// Outline color for the cell under the pointer.
pub const HOVER_OUTLINE_COLOR: &str = "#0F172A";
