//! Coordinate mapper for the brick lattice.
//!
//! A brick is addressed either by its linear index or by its `(x, y)` cell.
//! The two are related by `index = y * width + x`. Everything here is pure
//! and allocation-free.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

/// A single cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Fixed dimensions of the wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: u32,
    pub height: u32,
}

impl Default for Grid {
    fn default() -> Self {
        Self::MILLION
    }
}

impl Grid {
    /// The full wall: 1000 x 1000 bricks.
    pub const MILLION: Self = Self { width: 1000, height: 1000 };

    /// The small product variant: 1000 bricks laid out 40 x 25.
    pub const THOUSAND: Self = Self { width: 40, height: 25 };

    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of addressable bricks.
    #[must_use]
    pub fn len(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Map a linear index to its cell. The caller guarantees `index < len()`.
    #[must_use]
    pub fn to_xy(self, index: u32) -> Cell {
        Cell { x: index % self.width, y: index / self.width }
    }

    /// Map a cell back to its linear index. The caller guarantees the cell is in range.
    #[must_use]
    pub fn to_index(self, x: u32, y: u32) -> u32 {
        y * self.width + x
    }

    /// Like [`Grid::to_xy`], but `None` for indices outside the wall.
    #[must_use]
    pub fn checked_xy(self, index: u32) -> Option<Cell> {
        self.contains_index(index).then(|| self.to_xy(index))
    }

    /// Like [`Grid::to_index`], but `None` for cells outside the wall.
    #[must_use]
    pub fn checked_index(self, x: u32, y: u32) -> Option<u32> {
        self.contains_xy(x, y).then(|| self.to_index(x, y))
    }

    #[must_use]
    pub fn contains_xy(self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    #[must_use]
    pub fn contains_index(self, index: u32) -> bool {
        u64::from(index) < self.len()
    }
}
