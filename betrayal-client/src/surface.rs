//! Render surface contract
//!
//! The session calls into a `Surface` to show screens, HUD values and the
//! board. Implementations paint however they like; every call must be safe
//! to repeat at any time.

use betrayal_core::{Board, Cell, MatchState, Player};

use crate::screen::ScreenPhase;

pub trait Surface {
    /// Switch to the screen for `phase`
    fn show_screen(&mut self, phase: &ScreenPhase);

    fn set_join_code(&mut self, code: &str);

    fn set_lobby_occupancy(&mut self, players: u32);

    fn set_clock(&mut self, clock: &str);

    /// Local action-point balance, `None` once eliminated
    fn set_action_points(&mut self, points: Option<u32>);

    /// Draw cells, players, reachable ranges and the selection
    fn render(&mut self, board: &Board, state: &MatchState);

    fn show_notice(&mut self, message: &str);

    fn clear_notice(&mut self);

    /// Blocking, user-visible error
    fn alert(&mut self, message: &str);
}

/// Surface that keeps the last value of everything it was told to show.
///
/// Useful headless, and as a probe in tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    pub screens: Vec<ScreenPhase>,
    pub join_code: Option<String>,
    pub occupancy: Option<u32>,
    pub clock: Option<String>,
    pub action_points: Option<String>,
    pub renders: usize,
    pub notice: Option<String>,
    pub alerts: Vec<String>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_screen(&self) -> Option<&ScreenPhase> {
        self.screens.last()
    }
}

impl Surface for RecordingSurface {
    fn show_screen(&mut self, phase: &ScreenPhase) {
        self.screens.push(phase.clone());
    }

    fn set_join_code(&mut self, code: &str) {
        self.join_code = Some(code.to_string());
    }

    fn set_lobby_occupancy(&mut self, players: u32) {
        self.occupancy = Some(players);
    }

    fn set_clock(&mut self, clock: &str) {
        self.clock = Some(clock.to_string());
    }

    fn set_action_points(&mut self, points: Option<u32>) {
        self.action_points = Some(format_action_points(points));
    }

    fn render(&mut self, _board: &Board, _state: &MatchState) {
        self.renders += 1;
    }

    fn show_notice(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }

    fn clear_notice(&mut self) {
        self.notice = None;
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

/// `MM:SS` for a countdown in seconds
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// HUD text for an action-point balance
pub fn format_action_points(points: Option<u32>) -> String {
    match points {
        Some(points) => points.to_string(),
        None => "X".to_string(),
    }
}

/// Board cells inside a player's range
pub fn reachable_cells<'a>(board: &'a Board, player: &Player) -> Vec<&'a Cell> {
    // No two cells are further apart than the board's width
    let span = u32::try_from(board.size()).unwrap_or(u32::MAX);
    player
        .state
        .as_ref()
        .map(|s| s.cells_in_range_within(span))
        .unwrap_or_default()
        .into_iter()
        .filter_map(|hex| board.get(hex))
        .collect()
}
