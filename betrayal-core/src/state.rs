//! Match state mirrored from the server
//!
//! The server owns every rule. This model only holds the latest authoritative
//! roster plus the locally selected cell, which is input in progress and
//! never arrives from the server.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::hex::Hex;
use crate::player::Player;
use crate::protocol::Snapshot;

/// Match lifecycle as reported by the server
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    #[serde(alias = "initialized")]
    Waiting,
    Active,
    Completed,
}

/// Roster, status and local selection for one match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    players: FxHashMap<String, Player>,
    local_player: String,
    status: MatchStatus,
    #[serde(skip)]
    selected: Option<Hex>,
}

impl MatchState {
    pub fn new(local_player: impl Into<String>) -> Self {
        Self {
            players: FxHashMap::default(),
            local_player: local_player.into(),
            status: MatchStatus::Waiting,
            selected: None,
        }
    }

    /// Build a state from an authoritative snapshot.
    ///
    /// Nothing from any earlier state carries over, selection included.
    pub fn from_snapshot(snapshot: Snapshot, local_player: impl Into<String>) -> Self {
        Self {
            players: snapshot.players.into_iter().collect(),
            local_player: local_player.into(),
            status: snapshot.status,
            selected: None,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn local_player_id(&self) -> &str {
        &self.local_player
    }

    pub fn local_player(&self) -> Option<&Player> {
        self.players.get(&self.local_player)
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn set_status(&mut self, status: MatchStatus) {
        self.status = status;
    }

    pub fn selected(&self) -> Option<Hex> {
        self.selected
    }

    /// Player standing on `hex`, if any
    pub fn player_at(&self, hex: Hex) -> Option<&Player> {
        self.players
            .values()
            .find(|p| p.state.as_ref().is_some_and(|s| s.position == hex))
    }

    // ========================================================================
    // ROSTER
    // ========================================================================

    pub fn add_player(&mut self, player: Player) {
        self.players.insert(player.id.clone(), player);
    }

    pub fn remove_player(&mut self, id: &str) -> Option<Player> {
        self.players.remove(id)
    }

    /// Move a player. Returns false if the player is unknown or eliminated.
    pub fn set_position(&mut self, id: &str, hex: Hex) -> bool {
        match self.players.get_mut(id).and_then(|p| p.state.as_mut()) {
            Some(state) => {
                state.position = hex;
                true
            }
            None => false,
        }
    }

    /// Change a player's range. Returns false if the player is unknown or eliminated.
    pub fn set_range(&mut self, id: &str, range: u32) -> bool {
        match self.players.get_mut(id).and_then(|p| p.state.as_mut()) {
            Some(state) => {
                state.range = range;
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // SELECTION
    // ========================================================================

    pub fn select(&mut self, hex: Option<Hex>) {
        self.selected = hex;
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ========================================================================
    // OUTCOME
    // ========================================================================

    /// Players alive in `previous` but not in `self`, sorted by id
    pub fn eliminations<'a>(&'a self, previous: &MatchState) -> Vec<&'a Player> {
        let mut out: Vec<&Player> = self
            .players
            .values()
            .filter(|p| !p.is_alive())
            .filter(|p| previous.player(&p.id).is_some_and(Player::is_alive))
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// The only player still alive, if exactly one is
    pub fn last_standing(&self) -> Option<&Player> {
        let mut alive = self.players.values().filter(|p| p.is_alive());
        match (alive.next(), alive.next()) {
            (Some(player), None) => Some(player),
            _ => None,
        }
    }
}
