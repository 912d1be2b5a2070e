//! Players and their per-match state

use serde::{Deserialize, Serialize};

use crate::hex::{disc, ring, Hex};

pub const STARTING_HEARTS: u32 = 3;
pub const STARTING_RANGE: u32 = 1;

/// A player in a match. `state` is `None` once eliminated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub color: String,
    pub state: Option<PlayerState>,
}

impl Player {
    pub fn new(id: impl Into<String>, color: impl Into<String>, position: Hex) -> Self {
        Self {
            id: id.into(),
            color: color.into(),
            state: Some(PlayerState::new(position)),
        }
    }

    /// Still in the game: has a state and at least one heart
    pub fn is_alive(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.hearts > 0)
    }

    pub fn action_points(&self) -> Option<u32> {
        self.state.as_ref().map(|s| s.action_points)
    }
}

/// Mutable per-player state.
///
/// The reachable cells are derived from `position` and `range` on every read,
/// so there is nothing to keep in sync when either changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub hearts: u32,
    pub range: u32,
    pub action_points: u32,
    pub position: Hex,
}

impl PlayerState {
    pub fn new(position: Hex) -> Self {
        Self {
            hearts: STARTING_HEARTS,
            range: STARTING_RANGE,
            action_points: 0,
            position,
        }
    }

    /// Cells within range, excluding the player's own cell
    pub fn cells_in_range(&self) -> Vec<Hex> {
        disc(self.position, self.range)
    }

    /// Cells within range, with range capped at `limit`
    pub fn cells_in_range_within(&self, limit: u32) -> Vec<Hex> {
        disc(self.position, self.range.min(limit))
    }

    /// Cells exactly at max range
    pub fn cells_at_max_range(&self) -> Vec<Hex> {
        ring(self.position, self.range)
    }

    pub fn is_in_range(&self, hex: Hex) -> bool {
        let distance = self.position.distance_to(hex);
        distance >= 1 && distance <= self.range
    }
}
