//! Pixel layout of the hex board
//!
//! Maps axial cells to pointy-top pixel centers inside a render extent and
//! back. The board's `(0, 0)` corner is offset so the clipped hexagon sits
//! centered in the extent.

use serde::{Deserialize, Serialize};

use crate::hex::{round_axial, Hex};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Ratio between the fitted board radius and a single cell radius
const CELL_FIT_DIVISOR: f64 = 1.9;

/// A point in render-surface coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Render extent plus cell sizing for one board
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub board_size: usize,
    pub cell_radius: f64,
}

impl Layout {
    /// Size cells so the whole board fits inside `width` x `height`
    pub fn fit(width: f64, height: f64, board_size: usize) -> Self {
        Self {
            width,
            height,
            board_size,
            cell_radius: cell_radius(width, height, board_size),
        }
    }

    pub fn cell_width(&self) -> f64 {
        SQRT_3 * self.cell_radius
    }

    pub fn cell_height(&self) -> f64 {
        2.0 * self.cell_radius
    }

    /// Columns spanned by the widest row of the square index
    pub fn horizontal_cell_count(&self) -> usize {
        self.board_size / 2 + self.board_size
    }

    fn origin(&self) -> Point {
        let offset_x = self.cell_width() * (self.horizontal_cell_count() as f64 - 1.0) / 2.0;
        let offset_y = 0.75 * self.cell_height() * (self.board_size as f64 - 1.0) / 2.0;
        Point::new(self.width / 2.0 - offset_x, self.height / 2.0 - offset_y)
    }

    /// Pixel center of a hex
    pub fn axial_to_pixel(&self, hex: Hex) -> Point {
        let origin = self.origin();
        let (r, q) = (hex.r as f64, hex.q as f64);
        let w = self.cell_width();
        Point::new(
            origin.x + 0.5 * w * r + w * q,
            origin.y + 0.75 * self.cell_height() * r,
        )
    }

    /// Hex containing a pixel. Exact inverse of `axial_to_pixel` at centers.
    pub fn pixel_to_axial(&self, point: Point) -> Hex {
        let origin = self.origin();
        let x = point.x - origin.x;
        let y = point.y - origin.y;

        let q = (SQRT_3 / 3.0 * x - y / 3.0) / self.cell_radius;
        let r = (2.0 / 3.0 * y) / self.cell_radius;

        round_axial(r, q)
    }
}

/// Cell radius that fits a `board_size` board into the extent
pub fn cell_radius(width: f64, height: f64, board_size: usize) -> f64 {
    let half_extent = (height / 2.0).min(width / 2.0);
    half_extent / board_size as f64 / CELL_FIT_DIVISOR
}
