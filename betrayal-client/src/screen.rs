//! Client screen phases and their transition table
//!
//! Phases change on local UI intent or on protocol events. Each entered phase
//! is written to a history of serialized `(phase, snapshot)` entries so
//! back/forward navigation can restore it without talking to the server.

use serde::{Deserialize, Serialize};

use betrayal_core::MatchState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ScreenPhase {
    ChooseStartOrJoin,
    Rules,
    /// Hosting a new match and waiting for players to join
    Hosting {
        join_code: Option<String>,
        players: u32,
    },
    JoiningByCode,
    WaitingForStart {
        players: u32,
    },
    InMatch,
    GameOver {
        winner_color: String,
    },
}

/// Something that may move the client to another phase
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    NewGame,
    JoinGame,
    ShowRules,
    Leave,
    MatchInitialized { join_code: String },
    PlayerJoined { players: u32, is_host: bool },
    MatchStarted,
    GameWon { winner_color: String },
}

impl ScreenPhase {
    /// Phase reached from `self` on `trigger`, or `None` if it does not apply
    pub fn next(&self, trigger: &Trigger) -> Option<ScreenPhase> {
        use ScreenPhase::*;

        match (self, trigger) {
            (ChooseStartOrJoin, Trigger::NewGame) => Some(Hosting {
                join_code: None,
                players: 0,
            }),
            (ChooseStartOrJoin, Trigger::JoinGame) => Some(JoiningByCode),
            (ChooseStartOrJoin, Trigger::ShowRules) => Some(Rules),
            (Rules | JoiningByCode | GameOver { .. }, Trigger::Leave) => Some(ChooseStartOrJoin),

            (Hosting { .. }, Trigger::MatchInitialized { join_code }) => Some(Hosting {
                join_code: Some(join_code.clone()),
                players: 1,
            }),
            (Hosting { join_code, .. }, Trigger::PlayerJoined { players, is_host: true }) => {
                Some(Hosting {
                    join_code: join_code.clone(),
                    players: *players,
                })
            }
            (JoiningByCode | WaitingForStart { .. }, Trigger::PlayerJoined { players, is_host: false }) => {
                Some(WaitingForStart { players: *players })
            }

            // A joiner may never hear about the lobby; some servers only tell the host
            (Hosting { .. } | JoiningByCode | WaitingForStart { .. }, Trigger::MatchStarted) => {
                Some(InMatch)
            }
            (InMatch, Trigger::GameWon { winner_color }) => Some(GameOver {
                winner_color: winner_color.clone(),
            }),

            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScreenPhase::ChooseStartOrJoin => "choose-start-or-join",
            ScreenPhase::Rules => "rules",
            ScreenPhase::Hosting { .. } => "hosting",
            ScreenPhase::JoiningByCode => "joining-by-code",
            ScreenPhase::WaitingForStart { .. } => "waiting-for-start",
            ScreenPhase::InMatch => "in-match",
            ScreenPhase::GameOver { .. } => "game-over",
        }
    }

    fn same_screen(&self, other: &ScreenPhase) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// How a transition touched the screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// A different screen was entered
    Entered,
    /// Same screen, new data
    Updated,
}

/// One restorable point in navigation history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub phase: ScreenPhase,
    pub snapshot: Option<MatchState>,
}

/// Current phase plus serialized navigation history
#[derive(Clone, Debug)]
pub struct ScreenMachine {
    phase: ScreenPhase,
    history: Vec<String>,
    cursor: usize,
}

impl Default for ScreenMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenMachine {
    pub fn new() -> Self {
        Self {
            phase: ScreenPhase::ChooseStartOrJoin,
            history: Vec::new(),
            cursor: 0,
        }
    }

    pub fn phase(&self) -> &ScreenPhase {
        &self.phase
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Run a trigger through the transition table
    pub fn apply(&mut self, trigger: &Trigger) -> Option<Step> {
        let next = self.phase.next(trigger)?;
        let step = if next.same_screen(&self.phase) {
            Step::Updated
        } else {
            Step::Entered
        };
        self.phase = next;
        Some(step)
    }

    /// Write the current phase to history.
    ///
    /// `Entered` pushes a new entry and drops anything forward of the cursor;
    /// `Updated` overwrites the entry at the cursor.
    pub fn record(&mut self, step: Step, snapshot: Option<&MatchState>) -> serde_json::Result<()> {
        let entry = HistoryEntry {
            phase: self.phase.clone(),
            snapshot: snapshot.cloned(),
        };
        let serialized = serde_json::to_string(&entry)?;

        if step == Step::Updated && !self.history.is_empty() {
            self.history[self.cursor] = serialized;
        } else {
            if !self.history.is_empty() {
                self.history.truncate(self.cursor + 1);
            }
            self.history.push(serialized);
            self.cursor = self.history.len() - 1;
        }
        Ok(())
    }

    pub fn back(&mut self) -> Option<serde_json::Result<HistoryEntry>> {
        if self.cursor == 0 {
            return None;
        }
        self.restore(self.cursor - 1)
    }

    pub fn forward(&mut self) -> Option<serde_json::Result<HistoryEntry>> {
        if self.cursor + 1 >= self.history.len() {
            return None;
        }
        self.restore(self.cursor + 1)
    }

    fn restore(&mut self, index: usize) -> Option<serde_json::Result<HistoryEntry>> {
        let entry = match serde_json::from_str::<HistoryEntry>(&self.history[index]) {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };
        self.cursor = index;
        self.phase = entry.phase.clone();
        Some(Ok(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use betrayal_core::{Hex, Player};

    fn joined(players: u32, is_host: bool) -> Trigger {
        Trigger::PlayerJoined { players, is_host }
    }

    #[test]
    fn test_host_path() {
        let mut screen = ScreenMachine::new();
        assert_eq!(screen.apply(&Trigger::NewGame), Some(Step::Entered));
        assert_eq!(
            screen.apply(&Trigger::MatchInitialized { join_code: "abcd".into() }),
            Some(Step::Updated)
        );
        assert_eq!(screen.apply(&joined(2, true)), Some(Step::Updated));
        assert_eq!(
            screen.phase(),
            &ScreenPhase::Hosting { join_code: Some("abcd".into()), players: 2 }
        );
        assert_eq!(screen.apply(&Trigger::MatchStarted), Some(Step::Entered));
        assert_eq!(
            screen.apply(&Trigger::GameWon { winner_color: "blue".into() }),
            Some(Step::Entered)
        );
        assert_eq!(screen.apply(&Trigger::Leave), Some(Step::Entered));
        assert_eq!(screen.phase(), &ScreenPhase::ChooseStartOrJoin);
    }

    #[test]
    fn test_joiner_path() {
        let mut screen = ScreenMachine::new();
        screen.apply(&Trigger::JoinGame);
        assert_eq!(screen.apply(&joined(2, false)), Some(Step::Entered));
        assert_eq!(screen.apply(&joined(3, false)), Some(Step::Updated));
        assert_eq!(screen.phase(), &ScreenPhase::WaitingForStart { players: 3 });
        assert_eq!(screen.apply(&Trigger::MatchStarted), Some(Step::Entered));
        assert_eq!(screen.phase(), &ScreenPhase::InMatch);
    }

    #[test]
    fn test_joiner_starts_without_lobby_update() {
        let mut screen = ScreenMachine::new();
        screen.apply(&Trigger::JoinGame);
        assert_eq!(screen.apply(&Trigger::MatchStarted), Some(Step::Entered));
        assert_eq!(screen.phase(), &ScreenPhase::InMatch);
    }

    #[test]
    fn test_out_of_phase_triggers_are_ignored() {
        let mut screen = ScreenMachine::new();
        assert_eq!(screen.apply(&Trigger::MatchStarted), None);
        assert_eq!(screen.apply(&Trigger::MatchInitialized { join_code: "x".into() }), None);
        assert_eq!(screen.apply(&Trigger::GameWon { winner_color: "red".into() }), None);
        assert_eq!(screen.apply(&Trigger::Leave), None);
        assert_eq!(screen.phase(), &ScreenPhase::ChooseStartOrJoin);

        screen.apply(&Trigger::NewGame);
        // A host never drops into the joiner's waiting screen
        assert_eq!(screen.apply(&joined(2, false)), None);
        assert_eq!(screen.apply(&Trigger::NewGame), None);
    }

    #[test]
    fn test_rules_round_trip() {
        let mut screen = ScreenMachine::new();
        assert_eq!(screen.apply(&Trigger::ShowRules), Some(Step::Entered));
        assert_eq!(screen.phase(), &ScreenPhase::Rules);
        assert_eq!(screen.apply(&Trigger::Leave), Some(Step::Entered));
        assert_eq!(screen.phase(), &ScreenPhase::ChooseStartOrJoin);
    }

    #[test]
    fn test_history_back_and_forward() {
        let mut screen = ScreenMachine::new();
        screen.record(Step::Entered, None).unwrap();

        screen.apply(&Trigger::JoinGame);
        screen.record(Step::Entered, None).unwrap();
        screen.apply(&joined(2, false));
        screen.record(Step::Entered, None).unwrap();

        let mut state = MatchState::new("guest-a");
        state.add_player(Player::new("guest-a", "blue", Hex::new(8, 8)));
        screen.apply(&Trigger::MatchStarted);
        screen.record(Step::Entered, Some(&state)).unwrap();
        assert_eq!(screen.history_len(), 4);

        let entry = screen.back().unwrap().unwrap();
        assert_eq!(entry.phase, ScreenPhase::WaitingForStart { players: 2 });
        assert!(entry.snapshot.is_none());
        assert_eq!(screen.phase(), &entry.phase);

        let entry = screen.forward().unwrap().unwrap();
        assert_eq!(entry.phase, ScreenPhase::InMatch);
        assert_eq!(entry.snapshot, Some(state));
        assert!(screen.forward().is_none());

        screen.back();
        screen.back();
        screen.back();
        assert_eq!(screen.phase(), &ScreenPhase::ChooseStartOrJoin);
        assert!(screen.back().is_none());
    }

    #[test]
    fn test_entering_after_back_drops_forward_entries() {
        let mut screen = ScreenMachine::new();
        screen.record(Step::Entered, None).unwrap();
        screen.apply(&Trigger::ShowRules);
        screen.record(Step::Entered, None).unwrap();
        screen.back();

        screen.apply(&Trigger::NewGame);
        screen.record(Step::Entered, None).unwrap();
        assert_eq!(screen.history_len(), 2);
        assert!(screen.forward().is_none());
    }

    #[test]
    fn test_updates_overwrite_current_entry() {
        let mut screen = ScreenMachine::new();
        screen.record(Step::Entered, None).unwrap();
        screen.apply(&Trigger::NewGame);
        screen.record(Step::Entered, None).unwrap();
        screen.apply(&Trigger::MatchInitialized { join_code: "beef".into() });
        screen.record(Step::Updated, None).unwrap();
        assert_eq!(screen.history_len(), 2);

        screen.back();
        let entry = screen.forward().unwrap().unwrap();
        assert_eq!(
            entry.phase,
            ScreenPhase::Hosting { join_code: Some("beef".into()), players: 1 }
        );
    }
}
