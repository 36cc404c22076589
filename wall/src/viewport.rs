//! Viewport model: zoom/pan state and the layout derived from it.
//!
//! The wall is always laid out relative to the container center. With a zero
//! pan the whole grid is centered; the pan is an additional screen-space shift
//! applied on top of that centering. All positions are CSS pixels.
//!
//! Layout math lives on [`Layout`] so the renderer, the input controller and
//! the overlay all read the same numbers for the same frame.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::consts::{BASE_CELL_SIZE_PX, DEFAULT_ZOOM, FALLBACK_MIN_ZOOM, MAX_ZOOM, ZOOM_BUTTON_FACTOR};
use crate::grid::{Cell, Grid};

/// A point in screen space (CSS pixels) or in grid space (fractional cells).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

/// Container size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are positive and finite.
    #[must_use]
    pub fn is_measurable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

/// The mutable part of the viewport: zoom factor and pan offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self { zoom: DEFAULT_ZOOM, pan_x: 0.0, pan_y: 0.0 }
    }
}

/// Derived placement of the grid inside the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Edge length of one brick on screen.
    pub cell_size: f64,
    /// Screen x of the grid's left edge.
    pub offset_x: f64,
    /// Screen y of the grid's top edge.
    pub offset_y: f64,
}

/// Inclusive cell bounds of the part of the grid that intersects the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl VisibleRange {
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        (self.min_x..=self.max_x).contains(&cell.x) && (self.min_y..=self.max_y).contains(&cell.y)
    }

    /// Number of visible columns.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Number of visible rows.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}

/// Compute where the grid sits in a container of the given size.
///
/// `cell_size = base_cell_size * zoom`; the grid is centered and then shifted
/// by the pan.
#[must_use]
pub fn compute_layout(container: Size, grid: Grid, base_cell_size: f64, state: ViewportState) -> Layout {
    let cell_size = base_cell_size * state.zoom;
    let wall_width = cell_size * f64::from(grid.width);
    let wall_height = cell_size * f64::from(grid.height);
    Layout {
        cell_size,
        offset_x: (container.width - wall_width) / 2.0 + state.pan_x,
        offset_y: (container.height - wall_height) / 2.0 + state.pan_y,
    }
}

impl Layout {
    /// Convert a screen point to fractional grid coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new((screen.x - self.offset_x) / self.cell_size, (screen.y - self.offset_y) / self.cell_size)
    }

    /// Convert fractional grid coordinates to a screen point.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(world.x * self.cell_size + self.offset_x, world.y * self.cell_size + self.offset_y)
    }

    /// Screen position of a cell's top-left corner.
    #[must_use]
    pub fn cell_origin(&self, cell: Cell) -> Point {
        self.world_to_screen(Point::new(f64::from(cell.x), f64::from(cell.y)))
    }

    /// Resolve a screen point to the cell beneath it.
    ///
    /// Anything that does not land on the grid (including degenerate layouts)
    /// is `None`; this never panics.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn screen_to_cell(&self, screen: Point, grid: Grid) -> Option<Cell> {
        if !(self.cell_size > 0.0) {
            return None;
        }
        let world = self.screen_to_world(screen);
        let x = world.x.floor();
        let y = world.y.floor();
        if !(x >= 0.0 && y >= 0.0 && x < f64::from(grid.width) && y < f64::from(grid.height)) {
            return None;
        }
        Some(Cell::new(x as u32, y as u32))
    }

    /// Cells intersecting a container of the given size, clamped to the grid.
    ///
    /// `None` when the grid is entirely off screen or the layout is degenerate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn visible_range(&self, container: Size, grid: Grid) -> Option<VisibleRange> {
        if grid.is_empty() || !(self.cell_size > 0.0) {
            return None;
        }
        let last_col = f64::from(grid.width - 1);
        let last_row = f64::from(grid.height - 1);

        let min_x = (-self.offset_x / self.cell_size).floor().max(0.0);
        let max_x = ((container.width - self.offset_x) / self.cell_size).ceil().min(last_col);
        let min_y = (-self.offset_y / self.cell_size).floor().max(0.0);
        let max_y = ((container.height - self.offset_y) / self.cell_size).ceil().min(last_row);

        if !(min_x <= max_x && min_y <= max_y) {
            return None;
        }
        Some(VisibleRange { min_x: min_x as u32, max_x: max_x as u32, min_y: min_y as u32, max_y: max_y as u32 })
    }
}

/// How the lower zoom bound is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MinZoom {
    /// A constant lower bound.
    Fixed(f64),
    /// The zoom at which the whole grid just fits the container.
    FitGrid,
}

/// Zoom/pan state together with everything needed to derive a [`Layout`].
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub grid: Grid,
    pub base_cell_size: f64,
    pub container: Size,
    pub state: ViewportState,
    pub min_zoom_rule: MinZoom,
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Grid::default())
    }
}

impl Viewport {
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            base_cell_size: BASE_CELL_SIZE_PX,
            container: Size::default(),
            state: ViewportState::default(),
            min_zoom_rule: MinZoom::FitGrid,
            max_zoom: MAX_ZOOM,
        }
    }

    #[must_use]
    pub fn with_base_cell_size(mut self, base_cell_size: f64) -> Self {
        self.base_cell_size = base_cell_size;
        self
    }

    #[must_use]
    pub fn with_min_zoom(mut self, rule: MinZoom) -> Self {
        self.min_zoom_rule = rule;
        self.state.zoom = self.clamp_zoom(self.state.zoom);
        self
    }

    #[must_use]
    pub fn with_container(mut self, container: Size) -> Self {
        self.set_container(container);
        self
    }

    /// Current layout of the grid in the container.
    #[must_use]
    pub fn layout(&self) -> Layout {
        compute_layout(self.container, self.grid, self.base_cell_size, self.state)
    }

    /// Lower zoom bound under the active rule, never above `max_zoom`.
    #[must_use]
    pub fn min_zoom(&self) -> f64 {
        let min = match self.min_zoom_rule {
            MinZoom::Fixed(zoom) => zoom,
            MinZoom::FitGrid => self.fit_zoom().unwrap_or(FALLBACK_MIN_ZOOM),
        };
        if min.is_finite() && min > 0.0 { min.min(self.max_zoom) } else { FALLBACK_MIN_ZOOM.min(self.max_zoom) }
    }

    /// Zoom at which the full grid fits inside the container, if measurable.
    #[must_use]
    pub fn fit_zoom(&self) -> Option<f64> {
        if !self.container.is_measurable() || self.grid.is_empty() || !(self.base_cell_size > 0.0) {
            return None;
        }
        let scale_x = self.container.width / (f64::from(self.grid.width) * self.base_cell_size);
        let scale_y = self.container.height / (f64::from(self.grid.height) * self.base_cell_size);
        Some(scale_x.min(scale_y))
    }

    /// Clamp a zoom value into `[min_zoom, max_zoom]`. Non-finite input keeps the current zoom.
    #[must_use]
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        let min = self.min_zoom();
        if zoom.is_finite() {
            zoom.clamp(min, self.max_zoom)
        } else {
            self.state.zoom.clamp(min, self.max_zoom)
        }
    }

    /// Multiply the zoom by `factor`, keeping the grid point under `anchor` fixed.
    ///
    /// Returns whether the state changed.
    pub fn zoom_around_point(&mut self, factor: f64, anchor: Point) -> bool {
        if !(factor.is_finite() && factor > 0.0) {
            return false;
        }
        self.set_zoom_around_point(self.state.zoom * factor, anchor)
    }

    /// Set the zoom to `target` (clamped), keeping the grid point under `anchor` fixed.
    ///
    /// Returns whether the state changed.
    #[allow(clippy::float_cmp)]
    pub fn set_zoom_around_point(&mut self, target: f64, anchor: Point) -> bool {
        let before = self.state;
        let zoom = self.clamp_zoom(target);
        if zoom == before.zoom {
            return false;
        }
        let world = self.layout().screen_to_world(anchor);
        let cell_size = self.base_cell_size * zoom;
        if !world.x.is_finite() || !world.y.is_finite() {
            self.state.zoom = zoom;
            return true;
        }

        // Solve offset(zoom) + world * cell_size == anchor for the pan.
        let centered_x = (self.container.width - cell_size * f64::from(self.grid.width)) / 2.0;
        let centered_y = (self.container.height - cell_size * f64::from(self.grid.height)) / 2.0;
        self.state = ViewportState {
            zoom,
            pan_x: anchor.x - world.x * cell_size - centered_x,
            pan_y: anchor.y - world.y * cell_size - centered_y,
        };
        self.state != before
    }

    /// Shift the pan by a screen-space delta. Pan is unbounded.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.state.pan_x += dx;
        self.state.pan_y += dy;
    }

    /// Place the pan at an absolute value.
    pub fn set_pan(&mut self, pan_x: f64, pan_y: f64) {
        self.state.pan_x = pan_x;
        self.state.pan_y = pan_y;
    }

    /// Update the container size and re-clamp the zoom around its center.
    ///
    /// The grid point at the container center is independent of the container
    /// size, so resizing never jumps the view.
    pub fn set_container(&mut self, container: Size) {
        self.container = container;
        let center = container.center();
        self.set_zoom_around_point(self.state.zoom, center);
    }

    /// One zoom-button step in, anchored at the container center.
    pub fn zoom_in(&mut self) -> bool {
        self.zoom_around_point(ZOOM_BUTTON_FACTOR, self.container.center())
    }

    /// One zoom-button step out, anchored at the container center.
    pub fn zoom_out(&mut self) -> bool {
        self.zoom_around_point(1.0 / ZOOM_BUTTON_FACTOR, self.container.center())
    }

    /// Back to the default zoom with the grid centered.
    pub fn reset(&mut self) {
        self.state = ViewportState { zoom: self.clamp_zoom(DEFAULT_ZOOM), pan_x: 0.0, pan_y: 0.0 };
    }

    /// Whether the zoom sits at its lower bound.
    #[must_use]
    pub fn at_min_zoom(&self) -> bool {
        self.state.zoom <= self.min_zoom()
    }

    /// Whether the zoom sits at its upper bound.
    #[must_use]
    pub fn at_max_zoom(&self) -> bool {
        self.state.zoom >= self.max_zoom
    }
}
