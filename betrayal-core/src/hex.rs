//! Hex grid geometry with axial coordinates
//!
//! Cells are addressed by `(r, q)`. The implicit third cube coordinate is
//! `s = -r - q` and only shows up when rounding fractional positions.

use serde::{Deserialize, Serialize};

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub r: i32,
    pub q: i32,
}

impl Hex {
    pub const fn new(r: i32, q: i32) -> Self {
        Self { r, q }
    }

    /// The implicit third coordinate
    pub const fn s(&self) -> i32 {
        -self.r - self.q
    }

    pub const fn add(self, other: Hex) -> Hex {
        Hex::new(self.r + other.r, self.q + other.q)
    }

    pub const fn scale(self, factor: i32) -> Hex {
        Hex::new(self.r * factor, self.q * factor)
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> Hex {
        self.add(DIRECTIONS[direction % 6])
    }

    /// Distance between two hexes
    pub fn distance_to(&self, other: Hex) -> u32 {
        let dr = (self.r - other.r).abs();
        let dq = (self.q - other.q).abs();
        let ds = (self.s() - other.s()).abs();
        ((dr + dq + ds) / 2) as u32
    }
}

/// Direction vectors in axial coordinates as `(r, q)` steps.
///
/// Ring walks step through these in order, so adjacent entries must stay
/// adjacent on the hexagon.
pub const DIRECTIONS: [Hex; 6] = [
    Hex::new(0, 1),
    Hex::new(-1, 1),
    Hex::new(-1, 0),
    Hex::new(0, -1),
    Hex::new(1, -1),
    Hex::new(1, 0),
];

/// Direction a ring walk starts from before turning through `DIRECTIONS`
const RING_START: usize = 4;

/// Cells at exactly `radius` steps from `center`, in walk order.
///
/// Radius 0 is the center itself.
pub fn ring(center: Hex, radius: u32) -> Vec<Hex> {
    if radius == 0 {
        return vec![center];
    }

    let Some(radius) = i32::try_from(radius).ok().filter(|r| ring_fits(center, *r)) else {
        return Vec::new();
    };
    let mut results = Vec::with_capacity((6 * radius as usize).min(MAX_PREALLOCATED));
    let mut hex = center.add(DIRECTIONS[RING_START].scale(radius));
    for direction in 0..6 {
        for _ in 0..radius {
            results.push(hex);
            hex = hex.neighbor(direction);
        }
    }
    results
}

/// Every corner of the ring must be addressable without overflow
fn ring_fits(center: Hex, radius: i32) -> bool {
    [center.r, center.q]
        .iter()
        .all(|c| c.checked_add(radius).is_some() && c.checked_sub(radius).is_some())
}

/// Upper bound on up-front allocation for ring and disc walks
const MAX_PREALLOCATED: usize = 4096;

/// Rings 1 through `radius` concatenated. The center is never included.
///
/// Empty when the rings would leave the coordinate space.
pub fn disc(center: Hex, radius: u32) -> Vec<Hex> {
    if i32::try_from(radius).map_or(true, |r| !ring_fits(center, r)) {
        return Vec::new();
    }
    let mut results = Vec::with_capacity(disc_len(radius).min(MAX_PREALLOCATED));
    for step in 1..=radius {
        results.extend(ring(center, step));
    }
    results
}

/// Number of cells `disc` yields for a radius
pub const fn disc_len(radius: u32) -> usize {
    let radius = radius as usize;
    3usize.saturating_mul(radius).saturating_mul(radius + 1)
}

/// Snap fractional axial coordinates to the containing hex.
///
/// Each cube component is rounded on its own, then the one with the largest
/// rounding error is rebuilt from the other two so `r + q + s == 0` holds.
pub fn round_axial(r: f64, q: f64) -> Hex {
    let s = -r - q;

    let mut rr = r.round();
    let mut rq = q.round();
    let rs = s.round();

    let r_diff = (rr - r).abs();
    let q_diff = (rq - q).abs();
    let s_diff = (rs - s).abs();

    if q_diff > r_diff && q_diff > s_diff {
        rq = -rr - rs;
    } else if r_diff > s_diff {
        rr = -rq - rs;
    }

    Hex::new(rr as i32, rq as i32)
}
