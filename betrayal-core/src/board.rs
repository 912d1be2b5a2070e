//! Board index: the rhombus-clipped hexagon inside an N x N grid

use crate::hex::Hex;
use crate::layout::{Layout, Point};

/// Board size used by every match the server creates
pub const DEFAULT_BOARD_SIZE: usize = 17;

/// A present board slot with its resolved pixel center
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub hex: Hex,
    pub center: Point,
}

/// N x N grid of cells, `None` outside the playable hexagon
#[derive(Clone, Debug)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Cell>>,
}

impl Board {
    /// Lay out a board. Membership is fixed from here on.
    pub fn build(size: usize, layout: &Layout) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for r in 0..size {
            for q in 0..size {
                let hex = Hex::new(r as i32, q as i32);
                let cell = is_playable(hex, size).then(|| Cell {
                    hex,
                    center: layout.axial_to_pixel(hex),
                });
                cells.push(cell);
            }
        }
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, hex: Hex) -> Option<usize> {
        let size = self.size as i32;
        if hex.r < 0 || hex.q < 0 || hex.r >= size || hex.q >= size {
            return None;
        }
        Some(hex.r as usize * self.size + hex.q as usize)
    }

    /// Cell at `hex`, or `None` when absent or out of range
    pub fn get(&self, hex: Hex) -> Option<&Cell> {
        self.index(hex).and_then(|i| self.cells[i].as_ref())
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.get(hex).is_some()
    }

    /// Recompute pixel centers after a resize
    pub fn relayout(&mut self, layout: &Layout) {
        for cell in self.cells.iter_mut().flatten() {
            cell.center = layout.axial_to_pixel(cell.hex);
        }
    }

    /// Present cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }
}

/// Rhombus clipping rule: `floor(N/2) <= r + q <= 2(N-1) - floor(N/2)`
pub fn is_playable(hex: Hex, size: usize) -> bool {
    let size = size as i32;
    if hex.r < 0 || hex.q < 0 || hex.r >= size || hex.q >= size {
        return false;
    }
    let lower = size / 2;
    let upper = 2 * (size - 1) - lower;
    let sum = hex.r + hex.q;
    sum >= lower && sum <= upper
}

/// Closed-form cell count of a hexagon with `(size - 1) / 2` rings
pub fn playable_cell_count(size: usize) -> usize {
    let rings = (size - 1) / 2;
    3 * rings * (rings + 1) + 1
}
