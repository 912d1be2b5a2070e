//! Terminal render surface and command parser
//!
//! The board is drawn as text, one row of the square index per line, each row
//! shifted half a cell to the right like the pointy-top layout it mirrors.

use std::io::Write;

use anyhow::{bail, Context, Result};
use tracing::warn;

use betrayal_client::surface::{format_action_points, reachable_cells};
use betrayal_client::{LocalInput, ScreenPhase, Surface};
use betrayal_core::{Board, Hex, MatchState, Point};

pub const COMMANDS: &str = "\
commands:
  new                 host a new match
  join <code>         join a match by code
  rules               show the rules
  start               start the match (host only)
  select <r> <q>      select a cell
  click <x> <y>       click at a pixel of the render extent
  clear               clear the selection
  move | shoot | range | give
  resize <w> <h>      change the render extent
  back | forward      navigate history
  leave               return to the main menu
  quit";

const RULES: &str = "\
Rules
  - Everyone starts somewhere on the board with 3 hearts and 0 action points.
  - When the clock hits 00:00 every player receives 1 action point.
  - At any time a player may spend points to:
      move to an unoccupied cell in range (1 point)
      shoot a player in range (1 point)
      upgrade their range (current range + 1 points)
      give a point to a player in range (1 point)
  - A player with 0 hearts is eliminated and their points go to whoever
    eliminated them.
  Be the last player standing.";

// ============================================================================
// SURFACE
// ============================================================================

/// Surface writing plain text to any writer, stdout in practice
pub struct TerminalSurface<W: Write> {
    out: W,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!("Failed to write to terminal: {}", e);
        }
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn show_screen(&mut self, phase: &ScreenPhase) {
        let text = match phase {
            ScreenPhase::ChooseStartOrJoin => "== Betrayal ==\n  new | join | rules".to_string(),
            ScreenPhase::Rules => format!("{}\n  leave to go back", RULES),
            ScreenPhase::Hosting { .. } => "== New match ==\n  waiting for players, start when ready".to_string(),
            ScreenPhase::JoiningByCode => "== Join match ==\n  join <code>".to_string(),
            ScreenPhase::WaitingForStart { .. } => "== Waiting for the host to start ==".to_string(),
            ScreenPhase::InMatch => "== Match started ==".to_string(),
            ScreenPhase::GameOver { winner_color } => {
                format!("== Game over ==\n  {} is the last player standing\n  leave to exit", winner_color)
            }
        };
        self.emit(&text);
    }

    fn set_join_code(&mut self, code: &str) {
        self.emit(&format!("Join code: {}", code));
    }

    fn set_lobby_occupancy(&mut self, players: u32) {
        self.emit(&format!("Players in lobby: {}", players));
    }

    fn set_clock(&mut self, clock: &str) {
        self.emit(&format!("Next action point in {}", clock));
    }

    fn set_action_points(&mut self, points: Option<u32>) {
        self.emit(&format!("Action points: {}", format_action_points(points)));
    }

    fn render(&mut self, board: &Board, state: &MatchState) {
        let text = draw_board(board, state);
        self.emit(&text);
    }

    fn show_notice(&mut self, message: &str) {
        self.emit(&format!("! {}", message));
    }

    fn clear_notice(&mut self) {}

    fn alert(&mut self, message: &str) {
        self.emit(&format!("ERROR: {}", message));
    }
}

/// Text picture of the board plus a roster legend.
///
/// Players show as the first letter of their color, upper-case for the local
/// player. `[ ]` marks the selection, `:` cells the local player can reach.
pub fn draw_board(board: &Board, state: &MatchState) -> String {
    let reach: Vec<Hex> = state
        .local_player()
        .map(|p| reachable_cells(board, p).iter().map(|c| c.hex).collect())
        .unwrap_or_default();

    let mut lines = Vec::with_capacity(board.size() + state.player_count() + 1);
    for r in 0..board.size() as i32 {
        let mut line = " ".repeat(r as usize);
        for q in 0..board.size() as i32 {
            let hex = Hex::new(r, q);
            if !board.contains(hex) {
                line.push_str("  ");
                continue;
            }
            let mark = match state.player_at(hex) {
                Some(p) if p.is_alive() => {
                    let initial = p.color.chars().next().unwrap_or('?');
                    if p.id == state.local_player_id() {
                        initial.to_ascii_uppercase()
                    } else {
                        initial.to_ascii_lowercase()
                    }
                }
                _ if reach.contains(&hex) => ':',
                _ => '.',
            };
            if state.selected() == Some(hex) {
                line.push('[');
                line.push(mark);
                line.push(']');
            } else {
                line.push(mark);
                line.push(' ');
            }
        }
        lines.push(line.trim_end().to_string());
    }

    let mut roster: Vec<_> = state.players().collect();
    roster.sort_by(|a, b| a.id.cmp(&b.id));
    for player in roster {
        let line = match &player.state {
            Some(s) if player.is_alive() => format!(
                "  {:<8} hearts {} range {} points {} at ({}, {})",
                player.color, s.hearts, s.range, s.action_points, s.position.r, s.position.q
            ),
            _ => format!("  {:<8} eliminated", player.color),
        };
        lines.push(line);
    }

    lines.join("\n")
}

// ============================================================================
// COMMANDS
// ============================================================================

/// Parse one line typed by the user
pub fn parse_command(line: &str) -> Result<LocalInput> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        bail!("empty command");
    };
    let args: Vec<&str> = words.collect();

    let input = match (command, args.as_slice()) {
        ("new", []) => LocalInput::NewGame,
        ("join", []) => LocalInput::JoinGame,
        ("join", [code]) => LocalInput::SubmitJoinCode(code.to_string()),
        ("rules", []) => LocalInput::ShowRules,
        ("start", []) => LocalInput::StartMatch,
        ("select", [r, q]) => {
            let r = r.parse().with_context(|| format!("bad row '{}'", r))?;
            let q = q.parse().with_context(|| format!("bad column '{}'", q))?;
            LocalInput::Select(Some(Hex::new(r, q)))
        }
        ("click", [x, y]) => {
            let x = x.parse().with_context(|| format!("bad x '{}'", x))?;
            let y = y.parse().with_context(|| format!("bad y '{}'", y))?;
            LocalInput::ClickBoard(Point::new(x, y))
        }
        ("clear", []) => LocalInput::Select(None),
        ("move", []) => LocalInput::Move,
        ("shoot", []) => LocalInput::Shoot,
        ("range", []) => LocalInput::IncreaseRange,
        ("give", []) => LocalInput::GiveActionPoint,
        ("resize", [w, h]) => {
            let width: f64 = w.parse().with_context(|| format!("bad width '{}'", w))?;
            let height: f64 = h.parse().with_context(|| format!("bad height '{}'", h))?;
            if !(width > 0.0 && height > 0.0) {
                bail!("extent must be positive");
            }
            LocalInput::Resize { width, height }
        }
        ("back", []) => LocalInput::Back,
        ("forward", []) => LocalInput::Forward,
        ("leave", []) => LocalInput::Leave,
        ("quit" | "exit", []) => LocalInput::Quit,
        _ => bail!("unknown command '{}'", line.trim()),
    };

    Ok(input)
}
