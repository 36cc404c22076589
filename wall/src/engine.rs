use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::MIN_PINCH_DISTANCE_PX;
use crate::grid::Grid;
use crate::input::{InputState, PointerId, PointerKind, TrackedPointer, WheelDelta, exceeds_tap_threshold};
use crate::overlay::{HighlightSet, OverlayBox, overlay_boxes};
use crate::render::{self, Scene};
use crate::sold::{BrickChange, BrickRecord, Merge, SoldSet};
use crate::viewport::{Layout, Point, Size, Viewport};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A tap landed on a cell.
    BrickClicked { index: u32, x: u32, y: u32 },
    /// The cell under an idle pointer, reported on every move.
    HoverChanged(Option<u32>),
    /// Viewport or sold-set changed; the host should schedule a frame.
    RenderNeeded,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub viewport: Viewport,
    pub sold: SoldSet,
    pub highlights: HighlightSet,
    pub hover: Option<u32>,
    pub input: InputState,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(Grid::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            viewport: Viewport::new(grid),
            sold: SoldSet::new(grid),
            highlights: HighlightSet::new(),
            hover: None,
            input: InputState::default(),
            dpr: 1.0,
        }
    }

    #[must_use]
    pub fn grid(&self) -> Grid {
        self.viewport.grid
    }

    // --- Data inputs ---

    /// Merge a full load of sold bricks.
    pub fn load_snapshot(&mut self, records: Vec<BrickRecord>) -> Vec<Action> {
        if self.sold.load_snapshot(records) { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    /// Merge one realtime change.
    pub fn apply_change(&mut self, change: BrickChange) -> Merge {
        self.sold.apply(change)
    }

    /// Merge a batch of realtime changes in arrival order.
    pub fn apply_changes(&mut self, changes: impl IntoIterator<Item = BrickChange>) -> Vec<Action> {
        let mut changed = false;
        for change in changes {
            changed |= self.sold.apply(change).changed();
        }
        if changed { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    /// Replace the owned-brick outlines.
    pub fn set_highlights(&mut self, highlights: HighlightSet) {
        self.highlights = highlights;
    }

    // --- Viewport ---

    /// Update container dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.viewport.set_container(Size::new(width_css, height_css));
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        vec![Action::RenderNeeded]
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        render_if(self.viewport.zoom_in())
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        render_if(self.viewport.zoom_out())
    }

    /// Back to the default zoom with the wall centered.
    pub fn reset_view(&mut self) -> Vec<Action> {
        self.viewport.reset();
        vec![Action::RenderNeeded]
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, id: PointerId, kind: PointerKind, screen_pt: Point) -> Vec<Action> {
        match self.input {
            InputState::Idle => {
                self.input = InputState::Panning {
                    pointer: TrackedPointer::new(id, screen_pt),
                    start_screen: screen_pt,
                    start_pan: self.pan(),
                    dragged: false,
                };
                Vec::new()
            }
            InputState::Panning { pointer, .. } if kind.supports_pinch() && pointer.id != id => {
                let second = TrackedPointer::new(id, screen_pt);
                self.input = InputState::Pinching {
                    first: pointer,
                    second,
                    start_distance: pointer.position.distance(screen_pt).max(MIN_PINCH_DISTANCE_PX),
                    start_zoom: self.viewport.state.zoom,
                };
                Vec::new()
            }
            InputState::Panning { .. } | InputState::Pinching { .. } => Vec::new(),
        }
    }

    pub fn on_pointer_move(&mut self, id: PointerId, screen_pt: Point) -> Vec<Action> {
        match &mut self.input {
            InputState::Idle => {
                self.hover = self.cell_at(screen_pt);
                vec![Action::HoverChanged(self.hover)]
            }
            InputState::Panning { pointer, start_screen, start_pan, dragged } => {
                if pointer.id != id {
                    return Vec::new();
                }
                pointer.position = screen_pt;
                *dragged |= exceeds_tap_threshold(*start_screen, screen_pt);
                let pan_x = start_pan.x + (screen_pt.x - start_screen.x);
                let pan_y = start_pan.y + (screen_pt.y - start_screen.y);
                self.viewport.set_pan(pan_x, pan_y);
                vec![Action::RenderNeeded]
            }
            InputState::Pinching { first, second, start_distance, start_zoom } => {
                if first.id == id {
                    first.position = screen_pt;
                } else if second.id == id {
                    second.position = screen_pt;
                } else {
                    return Vec::new();
                }
                let distance = first.position.distance(second.position);
                let anchor = first.position.midpoint(second.position);
                let target = *start_zoom * (distance / *start_distance);
                render_if(self.viewport.set_zoom_around_point(target, anchor))
            }
        }
    }

    pub fn on_pointer_up(&mut self, id: PointerId, screen_pt: Point) -> Vec<Action> {
        match self.input {
            InputState::Panning { pointer, start_screen, dragged, .. } if pointer.id == id => {
                self.input = InputState::Idle;
                if dragged || exceeds_tap_threshold(start_screen, screen_pt) {
                    return Vec::new();
                }
                let Some(cell) = self.viewport.layout().screen_to_cell(screen_pt, self.grid()) else {
                    return Vec::new();
                };
                let index = self.grid().to_index(cell.x, cell.y);
                vec![Action::BrickClicked { index, x: cell.x, y: cell.y }]
            }
            InputState::Pinching { first, second, .. } if first.id == id || second.id == id => {
                let remaining = if first.id == id { second } else { first };
                self.input = InputState::Panning {
                    pointer: remaining,
                    start_screen: remaining.position,
                    start_pan: self.pan(),
                    dragged: true,
                };
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// The browser aborted the pointer (e.g. a system gesture). Never clicks.
    pub fn on_pointer_cancel(&mut self, id: PointerId) -> Vec<Action> {
        if self.input.tracks(id) {
            self.input = InputState::Idle;
        }
        Vec::new()
    }

    /// The pointer left the canvas.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.input = InputState::Idle;
        self.hover = None;
        vec![Action::HoverChanged(None)]
    }

    /// Zoom one notch around the cursor.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        let Some(factor) = delta.zoom_factor() else {
            return Vec::new();
        };
        render_if(self.viewport.zoom_around_point(factor, screen_pt))
    }

    // --- Queries ---

    /// Current layout of the wall in the container.
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.viewport.layout()
    }

    /// Index of the cell under a screen point.
    #[must_use]
    pub fn cell_at(&self, screen_pt: Point) -> Option<u32> {
        let cell = self.layout().screen_to_cell(screen_pt, self.grid())?;
        Some(self.grid().to_index(cell.x, cell.y))
    }

    /// Outline boxes for the current hover and highlights.
    #[must_use]
    pub fn overlay(&self) -> Vec<OverlayBox> {
        overlay_boxes(&self.layout(), self.viewport.container, self.grid(), &self.highlights, self.hover)
    }

    /// Stored record for a sold brick.
    #[must_use]
    pub fn brick(&self, index: u32) -> Option<BrickRecord> {
        self.sold.record(index)
    }

    #[must_use]
    pub fn scene(&self) -> Scene<'_> {
        Scene { viewport: &self.viewport, sold: &self.sold, dpr: self.dpr }
    }

    fn pan(&self) -> Point {
        Point::new(self.viewport.state.pan_x, self.viewport.state.pan_y)
    }
}

fn render_if(changed: bool) -> Vec<Action> {
    if changed { vec![Action::RenderNeeded] } else { Vec::new() }
}

/// The full wall engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: Option<CanvasRenderingContext2d>,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, grid: Grid) -> Self {
        Self { canvas, ctx: None, core: EngineCore::new(grid) }
    }

    /// Update viewport dimensions and device pixel ratio, resizing the backing store.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        let actions = self.core.set_viewport(width_css, height_css, dpr);
        let dpr = self.core.dpr;
        self.canvas.set_width((width_css * dpr).round().max(0.0) as u32);
        self.canvas.set_height((height_css * dpr).round().max(0.0) as u32);
        actions
    }

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context cannot be obtained or rejects a call.
    pub fn render(&mut self) -> Result<(), JsValue> {
        if self.ctx.is_none() {
            let ctx = self
                .canvas
                .get_context("2d")?
                .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
                .dyn_into::<CanvasRenderingContext2d>()
                .map_err(JsValue::from)?;
            self.ctx = Some(ctx);
        }
        let Some(ctx) = self.ctx.as_mut() else {
            return Ok(());
        };
        render::draw(ctx, &self.core.scene())
    }
}
