//! Overlay geometry: hover and ownership outlines.
//!
//! The host draws these as absolutely-positioned boxes above the canvas
//! rather than painting them into the bitmap. Positions come from the same
//! [`Layout`] the renderer used, so outlines stay aligned with painted cells.
//! Nothing here does its own hit-testing.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use std::collections::BTreeSet;

use crate::consts::{HOVER_OUTLINE_COLOR, OWNED_HIGHLIGHT_COLOR};
use crate::grid::Grid;
use crate::viewport::{Layout, Size};

/// Why a cell is outlined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// The brick belongs to the current user.
    Owned,
    /// The pointer is over the cell.
    Hover,
}

impl OverlayKind {
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Owned => OWNED_HIGHLIGHT_COLOR,
            Self::Hover => HOVER_OUTLINE_COLOR,
        }
    }

    /// CSS modifier class for the host element.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Owned => "wall-overlay__box wall-overlay__box--owned",
            Self::Hover => "wall-overlay__box wall-overlay__box--hover",
        }
    }
}

/// One outline rectangle in container CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayBox {
    pub index: u32,
    pub kind: OverlayKind,
    pub left: f64,
    pub top: f64,
    pub size: f64,
}

/// Indices to outline as owned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightSet {
    indices: BTreeSet<u32>,
}

impl HighlightSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, index: u32) -> bool {
        self.indices.contains(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.indices.iter().copied()
    }
}

impl FromIterator<u32> for HighlightSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self { indices: iter.into_iter().collect() }
    }
}

/// Boxes for every highlighted or hovered cell that is currently on screen.
///
/// Owned boxes come first in index order; the hover box, if any, is last so
/// it stacks on top.
#[must_use]
pub fn overlay_boxes(
    layout: &Layout,
    container: Size,
    grid: Grid,
    highlights: &HighlightSet,
    hover: Option<u32>,
) -> Vec<OverlayBox> {
    let Some(range) = layout.visible_range(container, grid) else {
        return Vec::new();
    };
    let place = |index: u32, kind: OverlayKind| {
        let cell = grid.checked_xy(index)?;
        if !range.contains(cell) {
            return None;
        }
        let origin = layout.cell_origin(cell);
        Some(OverlayBox { index, kind, left: origin.x, top: origin.y, size: layout.cell_size })
    };

    let mut boxes: Vec<OverlayBox> =
        highlights.iter().filter_map(|index| place(index, OverlayKind::Owned)).collect();
    if let Some(hovered) = hover.and_then(|index| place(index, OverlayKind::Hover)) {
        boxes.push(hovered);
    }
    boxes
}
