//! Rendering: paints the wall into a 2D surface.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives read-only views of the viewport and the sold-set and produces
//! pixels; it does not mutate any application state. Hover and ownership
//! outlines are not painted here (see [`crate::overlay`]).
//!
//! Drawing goes through the small [`Surface`] trait so the exact sequence of
//! operations can be checked without a browser. All work is bounded by the
//! visible cell range, never by the wall size.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::consts::{
    BACKGROUND_COLOR, GRID_LINE_COLOR, GRID_LINE_MIN_CELL_PX, GRID_LINE_WIDTH_PX, SOLD_CELL_INSET_PX, WALL_COLOR,
};
use crate::grid::Cell;
use crate::sold::SoldSet;
use crate::viewport::{Layout, Point, Size, Viewport, VisibleRange};

/// A line segment in CSS pixels.
pub type Segment = (Point, Point);

/// Minimal drawing target. Coordinates are CSS pixels after [`Surface::set_scale`].
pub trait Surface {
    type Error;

    /// Reset the transform to a uniform device-pixel-ratio scale.
    ///
    /// # Errors
    ///
    /// Returns the surface's error if the transform cannot be applied.
    fn set_scale(&mut self, dpr: f64) -> Result<(), Self::Error>;

    /// Clear `[0, width) x [0, height)`.
    fn clear(&mut self, width: f64, height: f64);

    fn fill_rect(&mut self, color: &str, x: f64, y: f64, width: f64, height: f64);

    /// Stroke every segment as one path.
    fn stroke_segments(&mut self, color: &str, line_width: f64, segments: &[Segment]);
}

/// Everything one frame needs.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub viewport: &'a Viewport,
    pub sold: &'a SoldSet,
    pub dpr: f64,
}

/// Draw one frame: background, wall area, grid lines, sold bricks.
///
/// # Errors
///
/// Returns `Err` if the surface rejects the transform.
pub fn draw<S: Surface>(surface: &mut S, scene: &Scene<'_>) -> Result<(), S::Error> {
    let container = scene.viewport.container;
    let dpr = if scene.dpr.is_finite() && scene.dpr > 0.0 { scene.dpr } else { 1.0 };

    surface.set_scale(dpr)?;
    surface.clear(container.width, container.height);
    surface.fill_rect(BACKGROUND_COLOR, 0.0, 0.0, container.width, container.height);

    let grid = scene.viewport.grid;
    let layout = scene.viewport.layout();
    let Some(range) = layout.visible_range(container, grid) else {
        return Ok(());
    };

    let (left, top, right, bottom) = wall_clip(&layout, container, range);
    surface.fill_rect(WALL_COLOR, left, top, right - left, bottom - top);

    let show_lines = layout.cell_size >= GRID_LINE_MIN_CELL_PX;
    if show_lines {
        let segments = grid_segments(&layout, range, (left, top, right, bottom));
        surface.stroke_segments(GRID_LINE_COLOR, GRID_LINE_WIDTH_PX, &segments);
    }

    let inset = if show_lines { SOLD_CELL_INSET_PX } else { 0.0 };
    let fill = (layout.cell_size - 2.0 * inset).max(0.0);
    for y in range.min_y..=range.max_y {
        let first = grid.to_index(range.min_x, y);
        let last = grid.to_index(range.max_x, y);
        for brick in scene.sold.span(first..=last) {
            let origin = layout.cell_origin(grid.to_xy(brick.index));
            surface.fill_rect(brick.color, origin.x + inset, origin.y + inset, fill, fill);
        }
    }
    Ok(())
}

/// Screen rectangle of the visible part of the wall, clipped to the container.
fn wall_clip(layout: &Layout, container: Size, range: VisibleRange) -> (f64, f64, f64, f64) {
    let start = layout.cell_origin(Cell::new(range.min_x, range.min_y));
    let end = layout.world_to_screen(Point::new(f64::from(range.max_x) + 1.0, f64::from(range.max_y) + 1.0));
    (start.x.max(0.0), start.y.max(0.0), end.x.min(container.width), end.y.min(container.height))
}

/// Cell boundary lines inside the visible range, clipped to the wall rectangle.
fn grid_segments(layout: &Layout, range: VisibleRange, clip: (f64, f64, f64, f64)) -> Vec<Segment> {
    let (left, top, right, bottom) = clip;
    let mut segments = Vec::with_capacity((range.columns() + range.rows() + 2) as usize);
    for col in range.min_x..=range.max_x + 1 {
        let x = layout.world_to_screen(Point::new(f64::from(col), 0.0)).x;
        if (left..=right).contains(&x) {
            segments.push((Point::new(x, top), Point::new(x, bottom)));
        }
    }
    for row in range.min_y..=range.max_y + 1 {
        let y = layout.world_to_screen(Point::new(0.0, f64::from(row))).y;
        if (top..=bottom).contains(&y) {
            segments.push((Point::new(left, y), Point::new(right, y)));
        }
    }
    segments
}

impl Surface for CanvasRenderingContext2d {
    type Error = JsValue;

    fn set_scale(&mut self, dpr: f64) -> Result<(), JsValue> {
        self.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)
    }

    fn clear(&mut self, width: f64, height: f64) {
        self.clear_rect(0.0, 0.0, width, height);
    }

    fn fill_rect(&mut self, color: &str, x: f64, y: f64, width: f64, height: f64) {
        self.set_fill_style_str(color);
        CanvasRenderingContext2d::fill_rect(self, x, y, width, height);
    }

    fn stroke_segments(&mut self, color: &str, line_width: f64, segments: &[Segment]) {
        self.begin_path();
        for (from, to) in segments {
            self.move_to(from.x, from.y);
            self.line_to(to.x, to.y);
        }
        self.set_stroke_style_str(color);
        self.set_line_width(line_width);
        self.stroke();
    }
}
