//! Session protocol driver
//!
//! A `Session` owns the one connection a client has. It turns local input into
//! outbound intents and inbound events into snapshot swaps and screen changes.
//! Every handler runs to completion before the next one starts, whether it is
//! called directly or from [`Session::run`].
//!
//! ## Architecture
//!
//! - Level 1: run() - event loop
//! - Level 2: handle_input(), handle_message(), dispatch(), tick()
//! - Level 3: one step per intent or event kind
//! - Level 4: send(), notify(), present()

use std::time::Instant;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

use betrayal_core::{
    Board, ClientIntent, Hex, Layout, MatchState, Player, Point, ServerEvent, Snapshot,
};

use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::notice::Notices;
use crate::screen::{HistoryEntry, ScreenMachine, ScreenPhase, Step, Trigger};
use crate::store::{MatchReader, MatchStore};
use crate::surface::{format_clock, Surface};
use crate::transport::{Transport, TransportEvent};

pub const INVALID_JOIN_CODE: &str = "Please enter a valid code";
pub const SELECT_MOVE_TARGET: &str = "Select a position to move";
pub const SELECT_SHOOT_TARGET: &str = "Select a player to shoot";
pub const SELECT_GIFT_TARGET: &str = "Select a player to give action point";

/// Something the local user did
#[derive(Clone, Debug, PartialEq)]
pub enum LocalInput {
    NewGame,
    JoinGame,
    ShowRules,
    SubmitJoinCode(String),
    StartMatch,
    /// Click at a surface pixel, snapped to the cell under it
    ClickBoard(Point),
    Select(Option<Hex>),
    Move,
    Shoot,
    IncreaseRange,
    GiveActionPoint,
    Resize { width: f64, height: f64 },
    Leave,
    Back,
    Forward,
    Quit,
}

/// Whether the loop keeps going after an input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Clone, Copy, Debug)]
enum Action {
    Move,
    Shoot,
    IncreaseRange,
    GiveActionPoint,
}

pub struct Session<T, S> {
    player_id: String,
    config: ClientConfig,
    transport: T,
    surface: S,
    store: MatchStore,
    screen: ScreenMachine,
    layout: Layout,
    board: Option<Board>,
    notices: Notices,
    /// Winner color and when to show the game-over screen
    pending_game_over: Option<(Instant, String)>,
}

impl<T: Transport, S: Surface> Session<T, S> {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    pub fn new(
        player_id: impl Into<String>,
        config: ClientConfig,
        transport: T,
        mut surface: S,
    ) -> Result<Self, SessionError> {
        let mut screen = ScreenMachine::new();
        screen.record(Step::Entered, None)?;
        surface.show_screen(screen.phase());

        Ok(Self {
            player_id: player_id.into(),
            layout: config.layout(),
            notices: Notices::new(config.notice_duration),
            config,
            transport,
            surface,
            store: MatchStore::new(),
            screen,
            board: None,
            pending_game_over: None,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn phase(&self) -> &ScreenPhase {
        self.screen.phase()
    }

    /// Read handle on the current match, for renderers on other tasks
    pub fn reader(&self) -> MatchReader {
        self.store.reader()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notices.current().map(|n| n.message.as_str())
    }

    /// Earliest instant at which `tick` has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        let game_over = self.pending_game_over.as_ref().map(|(at, _)| *at);
        self.notices.deadline().into_iter().chain(game_over).min()
    }

    // ========================================================================
    // LEVEL 1 - EVENT LOOP
    // ========================================================================

    /// Drive the session until the user quits or the connection closes.
    ///
    /// Undecodable messages are alerted and skipped. A closed connection is
    /// terminal and comes back as `SessionError::ConnectionClosed`.
    pub async fn run(
        mut self,
        mut inbound: UnboundedReceiver<TransportEvent>,
        mut inputs: UnboundedReceiver<LocalInput>,
    ) -> Result<(), SessionError> {
        info!("Session started for {}", self.player_id);

        loop {
            let wake = self.next_deadline();

            tokio::select! {
                event = inbound.recv() => match event {
                    Some(TransportEvent::Message(text)) => {
                        match self.handle_message(&text, Instant::now()) {
                            Ok(()) | Err(SessionError::Protocol(_)) => {}
                            Err(e) => return Err(e),
                        }
                    }
                    Some(TransportEvent::Closed) | None => {
                        error!("Connection to the server closed");
                        return Err(SessionError::ConnectionClosed);
                    }
                },
                input = inputs.recv() => match input {
                    Some(input) => {
                        if self.handle_input(input, Instant::now())? == Flow::Quit {
                            info!("Session ended by user");
                            return Ok(());
                        }
                    }
                    None => return Ok(()),
                },
                _ = wait_until(wake) => self.tick(Instant::now())?,
            }
        }
    }

    // ========================================================================
    // LEVEL 2 - HANDLERS
    // ========================================================================

    pub fn handle_input(&mut self, input: LocalInput, now: Instant) -> Result<Flow, SessionError> {
        debug!("Input {:?} in {}", input, self.screen.phase().name());

        match input {
            LocalInput::NewGame => self.new_game()?,
            LocalInput::JoinGame => {
                self.transition(Trigger::JoinGame)?;
            }
            LocalInput::ShowRules => {
                self.transition(Trigger::ShowRules)?;
            }
            LocalInput::SubmitJoinCode(code) => self.submit_join_code(&code, now)?,
            LocalInput::StartMatch => self.start_match()?,
            LocalInput::ClickBoard(point) => {
                let hex = self.layout.pixel_to_axial(point);
                self.select(Some(hex));
            }
            LocalInput::Select(hex) => self.select(hex),
            LocalInput::Move => self.commit(Action::Move, now)?,
            LocalInput::Shoot => self.commit(Action::Shoot, now)?,
            LocalInput::IncreaseRange => self.commit(Action::IncreaseRange, now)?,
            LocalInput::GiveActionPoint => self.commit(Action::GiveActionPoint, now)?,
            LocalInput::Resize { width, height } => self.resize(width, height),
            LocalInput::Leave => self.leave()?,
            LocalInput::Back => {
                let entry = self.screen.back();
                self.restore(entry)?;
            }
            LocalInput::Forward => {
                let entry = self.screen.forward();
                self.restore(entry)?;
            }
            LocalInput::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    /// Decode and dispatch one inbound frame.
    ///
    /// A frame that does not decode raises an alert and is returned as an
    /// error; nothing else changes.
    pub fn handle_message(&mut self, text: &str, now: Instant) -> Result<(), SessionError> {
        match ServerEvent::decode(text) {
            Ok(event) => self.dispatch(event, now),
            Err(e) => {
                error!("Discarding inbound message: {}", e);
                self.surface.alert(&e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn dispatch(&mut self, event: ServerEvent, now: Instant) -> Result<(), SessionError> {
        debug!("Dispatching {} in {}", event.kind(), self.screen.phase().name());

        match event {
            ServerEvent::MatchInitialized(payload) => {
                let trigger = Trigger::MatchInitialized {
                    join_code: payload.join_code.clone(),
                };
                if self.transition(trigger)?.is_some() {
                    info!("Hosting match {}", payload.join_code.to_uppercase());
                    self.surface.set_join_code(&payload.join_code.to_uppercase());
                    self.surface.set_lobby_occupancy(1);
                }
            }
            ServerEvent::PlayerJoined(payload) => {
                let is_host = payload
                    .is_main_client
                    .unwrap_or_else(|| matches!(self.screen.phase(), ScreenPhase::Hosting { .. }));
                let trigger = Trigger::PlayerJoined {
                    players: payload.player_count,
                    is_host,
                };
                if self.transition(trigger)?.is_some() {
                    self.surface.set_lobby_occupancy(payload.player_count);
                }
            }
            ServerEvent::MatchStarted(update) => self.start(update.game_state)?,
            ServerEvent::PlayerMoved(update)
            | ServerEvent::PlayerShot(update)
            | ServerEvent::RangeIncreased(update)
            | ServerEvent::ActionPointGiven(update)
            | ServerEvent::ActionPointAwarded(update) => {
                self.update_match(update.game_state)?;
            }
            ServerEvent::ActionRejected(rejection) => {
                info!("Action rejected: {}", rejection.message);
                self.notify(&rejection.message, now);
            }
            ServerEvent::PlayerWon(payload) => {
                if self.update_match(payload.game_state)? {
                    info!("Player {} won the match", payload.player_color);
                    let at = now + self.config.game_over_delay;
                    self.pending_game_over = Some((at, payload.player_color));
                }
            }
            ServerEvent::ClockTick(tick) => {
                self.surface.set_clock(&format_clock(tick.seconds));
            }
        }

        Ok(())
    }

    /// Run whatever timers are due at `now`
    pub fn tick(&mut self, now: Instant) -> Result<(), SessionError> {
        if self.notices.expire(now) {
            self.surface.clear_notice();
        }

        match self.pending_game_over.take() {
            Some((at, winner_color)) if at <= now => {
                self.transition(Trigger::GameWon { winner_color })?;
            }
            pending => self.pending_game_over = pending,
        }

        Ok(())
    }

    // ========================================================================
    // LEVEL 3 - LOBBY
    // ========================================================================

    fn new_game(&mut self) -> Result<(), SessionError> {
        if self.transition(Trigger::NewGame)?.is_some() {
            let intent = ClientIntent::InitializeMatch {
                player_id: self.player_id.clone(),
            };
            self.send(intent)?;
        }
        Ok(())
    }

    fn submit_join_code(&mut self, code: &str, now: Instant) -> Result<(), SessionError> {
        if *self.screen.phase() != ScreenPhase::JoiningByCode {
            warn!("Ignoring join code in {}", self.screen.phase().name());
            return Ok(());
        }

        let code = code.trim();
        if code.is_empty() {
            self.notify(INVALID_JOIN_CODE, now);
            return Ok(());
        }

        info!("Joining match {}", code.to_uppercase());
        self.surface.set_join_code(&code.to_uppercase());
        let intent = ClientIntent::JoinByCode {
            player_id: self.player_id.clone(),
            join_code: code.to_lowercase(),
        };
        self.send(intent)
    }

    /// Ask the server to start. The screen only changes once it agrees.
    fn start_match(&mut self) -> Result<(), SessionError> {
        if !matches!(self.screen.phase(), ScreenPhase::Hosting { .. }) {
            warn!("Only the host can start a match");
            return Ok(());
        }
        let intent = ClientIntent::StartMatch {
            player_id: self.player_id.clone(),
        };
        self.send(intent)
    }

    fn leave(&mut self) -> Result<(), SessionError> {
        if matches!(self.screen.phase(), ScreenPhase::GameOver { .. }) {
            info!("Leaving finished match");
            self.store.clear();
            self.board = None;
        }
        self.transition(Trigger::Leave)?;
        Ok(())
    }

    // ========================================================================
    // LEVEL 3 - MATCH
    // ========================================================================

    fn start(&mut self, snapshot: Snapshot) -> Result<(), SessionError> {
        if self.screen.phase().next(&Trigger::MatchStarted).is_none() {
            warn!("Ignoring match start in {}", self.screen.phase().name());
            return Ok(());
        }
        self.install(snapshot);
        self.transition(Trigger::MatchStarted)?;
        self.present();
        Ok(())
    }

    /// Swap in a mid-match snapshot. Returns false if no match is on screen.
    fn update_match(&mut self, snapshot: Snapshot) -> Result<bool, SessionError> {
        if *self.screen.phase() != ScreenPhase::InMatch {
            warn!("Ignoring match update in {}", self.screen.phase().name());
            return Ok(false);
        }
        self.install(snapshot);
        self.screen.record(Step::Updated, self.store.snapshot().as_deref())?;
        self.present();
        Ok(true)
    }

    fn install(&mut self, snapshot: Snapshot) {
        let state = MatchState::from_snapshot(snapshot, self.player_id.as_str());
        if let Some(previous) = self.store.snapshot() {
            for player in state.eliminations(&previous) {
                info!("Player {} ({}) was eliminated", player.id, player.color);
            }
        }
        self.ensure_board();
        self.store.replace(state);
    }

    /// Select a cell, or clear the selection for anything off the board
    fn select(&mut self, hex: Option<Hex>) {
        if !self.local_player_alive() {
            return;
        }
        let target = hex.filter(|h| self.board.as_ref().is_some_and(|b| b.contains(*h)));
        let current = self.store.snapshot().and_then(|s| s.selected());
        if target == current {
            return;
        }
        self.store.select(target);
        self.render();
    }

    /// Send an action intent, then drop the selection whatever the outcome
    fn commit(&mut self, action: Action, now: Instant) -> Result<(), SessionError> {
        if !self.local_player_alive() {
            debug!("Ignoring {:?}, local player is out", action);
            return Ok(());
        }

        let player_id = self.player_id.clone();
        let target = self.store.snapshot().and_then(|s| s.selected());

        let intent = match action {
            Action::IncreaseRange => ClientIntent::IncreaseRange { player_id },
            Action::Move => {
                let Some(hex) = target else {
                    self.notify(SELECT_MOVE_TARGET, now);
                    return Ok(());
                };
                ClientIntent::Move { player_id, hex }
            }
            Action::Shoot => {
                let Some(hex) = target else {
                    self.notify(SELECT_SHOOT_TARGET, now);
                    return Ok(());
                };
                ClientIntent::Shoot { player_id, hex }
            }
            Action::GiveActionPoint => {
                let Some(hex) = target else {
                    self.notify(SELECT_GIFT_TARGET, now);
                    return Ok(());
                };
                ClientIntent::GiveActionPoint { player_id, hex }
            }
        };

        self.store.select(None);
        self.render();
        self.send(intent)
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.config.extent = (width, height);
        self.layout = self.config.layout();
        if let Some(board) = self.board.as_mut() {
            board.relayout(&self.layout);
        }
        debug!(
            "Relayout to {}x{}, cell radius {:.2}",
            width, height, self.layout.cell_radius
        );
        self.render();
    }

    // ========================================================================
    // LEVEL 3 - NAVIGATION
    // ========================================================================

    fn transition(&mut self, trigger: Trigger) -> Result<Option<Step>, SessionError> {
        let from = self.screen.phase().name();
        let Some(step) = self.screen.apply(&trigger) else {
            warn!("Ignoring {:?} in {}", trigger, from);
            return Ok(None);
        };

        if step == Step::Entered {
            info!("Screen {} -> {}", from, self.screen.phase().name());
            self.surface.show_screen(self.screen.phase());
        }
        self.screen.record(step, self.store.snapshot().as_deref())?;
        Ok(Some(step))
    }

    /// Bring back a history entry without replaying protocol traffic.
    ///
    /// Hosting is the exception: the server is asked to initialize again.
    fn restore(
        &mut self,
        entry: Option<serde_json::Result<HistoryEntry>>,
    ) -> Result<(), SessionError> {
        let Some(entry) = entry else {
            debug!("No history in that direction");
            return Ok(());
        };
        let HistoryEntry { phase, snapshot } = entry?;

        self.pending_game_over = None;
        match snapshot {
            Some(state) => {
                self.ensure_board();
                self.store.replace(state);
            }
            None => {
                self.store.clear();
            }
        }

        info!("Restored {} from history", phase.name());
        self.surface.show_screen(&phase);

        match &phase {
            ScreenPhase::Hosting { join_code, players } => {
                if let Some(code) = join_code {
                    self.surface.set_join_code(&code.to_uppercase());
                }
                self.surface.set_lobby_occupancy(*players);
                let intent = ClientIntent::InitializeMatch {
                    player_id: self.player_id.clone(),
                };
                self.send(intent)?;
            }
            ScreenPhase::WaitingForStart { players } => {
                self.surface.set_lobby_occupancy(*players);
            }
            ScreenPhase::InMatch | ScreenPhase::GameOver { .. } => self.present(),
            ScreenPhase::ChooseStartOrJoin | ScreenPhase::Rules | ScreenPhase::JoiningByCode => {}
        }

        Ok(())
    }

    // ========================================================================
    // LEVEL 4 - UTILITIES
    // ========================================================================

    fn send(&mut self, intent: ClientIntent) -> Result<(), SessionError> {
        let text = intent.encode()?;
        debug!("Sending {}", intent.kind());
        self.transport.send(text)?;
        Ok(())
    }

    fn notify(&mut self, message: &str, now: Instant) {
        self.notices.show(message, now);
        self.surface.show_notice(message);
    }

    fn local_player_alive(&self) -> bool {
        *self.screen.phase() == ScreenPhase::InMatch
            && self
                .store
                .snapshot()
                .is_some_and(|s| s.local_player().is_some_and(Player::is_alive))
    }

    fn ensure_board(&mut self) {
        self.board
            .get_or_insert_with(|| Board::build(self.config.board_size, &self.layout));
    }

    /// Refresh the action-point HUD, then redraw
    fn present(&mut self) {
        if let Some(state) = self.store.snapshot() {
            let points = state
                .local_player()
                .filter(|p| p.is_alive())
                .and_then(Player::action_points);
            self.surface.set_action_points(points);
        }
        self.render();
    }

    fn render(&mut self) {
        if let (Some(board), Some(state)) = (self.board.as_ref(), self.store.snapshot()) {
            self.surface.render(board, &state);
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at.into()).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{json, Value};
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::surface::RecordingSurface;
    use crate::transport::ChannelTransport;

    type TestSession = Session<ChannelTransport, RecordingSurface>;

    fn session() -> (TestSession, UnboundedReceiver<String>) {
        let (transport, outbound) = ChannelTransport::pair();
        let session = Session::new(
            "guest-a",
            ClientConfig::default(),
            transport,
            RecordingSurface::new(),
        )
        .unwrap();
        (session, outbound)
    }

    fn sent(outbound: &mut UnboundedReceiver<String>) -> Vec<Value> {
        let mut out = Vec::new();
        while let Ok(text) = outbound.try_recv() {
            out.push(serde_json::from_str(&text).unwrap());
        }
        out
    }

    fn frame(kind: &str, payload: Value) -> String {
        json!({"type": kind, "payload": payload}).to_string()
    }

    fn player(id: &str, color: &str, r: i32, q: i32, action_points: u32) -> Value {
        json!({
            "id": id,
            "color": color,
            "state": {"hearts": 3, "range": 1, "actionPoints": action_points, "position": {"r": r, "q": q}}
        })
    }

    fn game_state(players: Vec<Value>) -> Value {
        let players: serde_json::Map<String, Value> = players
            .into_iter()
            .map(|p| (p["id"].as_str().unwrap().to_string(), p))
            .collect();
        json!({"players": players, "status": "active"})
    }

    fn two_players() -> Value {
        game_state(vec![player("guest-a", "blue", 8, 8, 1), player("guest-b", "red", 8, 10, 1)])
    }

    /// Session already on the in-match screen as host
    fn in_match() -> (TestSession, UnboundedReceiver<String>, Instant) {
        let (mut session, mut outbound) = session();
        let now = Instant::now();
        session.handle_input(LocalInput::NewGame, now).unwrap();
        session
            .handle_message(&frame("receive_initialize_game", json!({"joinCode": "abcd"})), now)
            .unwrap();
        session
            .handle_message(&frame("receive_start_game", json!({"gameState": two_players()})), now)
            .unwrap();
        sent(&mut outbound);
        (session, outbound, now)
    }

    fn selected(session: &TestSession) -> Option<Hex> {
        session.reader().snapshot().and_then(|s| s.selected())
    }

    #[test]
    fn test_new_game_hosts_and_shows_code() {
        let (mut session, mut outbound) = session();
        let now = Instant::now();
        assert_eq!(session.surface().current_screen(), Some(&ScreenPhase::ChooseStartOrJoin));

        session.handle_input(LocalInput::NewGame, now).unwrap();
        let messages = sent(&mut outbound);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["type"], "send_initialize_game");
        assert_eq!(messages[0]["payload"]["playerID"], "guest-a");

        session
            .handle_message(&frame("receive_initialize_game", json!({"joinCode": "wxyz"})), now)
            .unwrap();
        assert_eq!(session.surface().join_code.as_deref(), Some("WXYZ"));
        assert_eq!(session.surface().occupancy, Some(1));

        // No host flag: still hosting, so this client is the host
        session
            .handle_message(&frame("receive_join_game", json!({"playerCount": 2})), now)
            .unwrap();
        assert_eq!(
            session.phase(),
            &ScreenPhase::Hosting { join_code: Some("wxyz".into()), players: 2 }
        );
        assert_eq!(session.surface().occupancy, Some(2));
    }

    #[test]
    fn test_start_waits_for_server() {
        let (mut session, mut outbound) = session();
        let now = Instant::now();
        session.handle_input(LocalInput::NewGame, now).unwrap();
        sent(&mut outbound);

        session.handle_input(LocalInput::StartMatch, now).unwrap();
        assert_eq!(sent(&mut outbound)[0]["type"], "send_start_game");
        assert!(matches!(session.phase(), ScreenPhase::Hosting { .. }));

        session
            .handle_message(&frame("receive_start_game", json!({"gameState": two_players()})), now)
            .unwrap();
        assert_eq!(session.phase(), &ScreenPhase::InMatch);
        assert_eq!(session.reader().snapshot().map(|s| s.player_count()), Some(2));
        assert!(session.board().is_some());
        assert_eq!(session.surface().action_points.as_deref(), Some("1"));
        assert!(session.surface().renders > 0);
    }

    #[test]
    fn test_join_code_validation() {
        let (mut session, mut outbound) = session();
        let now = Instant::now();
        session.handle_input(LocalInput::JoinGame, now).unwrap();

        session.handle_input(LocalInput::SubmitJoinCode("   ".into()), now).unwrap();
        assert_eq!(session.notice(), Some(INVALID_JOIN_CODE));
        assert!(sent(&mut outbound).is_empty());

        session.handle_input(LocalInput::SubmitJoinCode("QrSt".into()), now).unwrap();
        let messages = sent(&mut outbound);
        assert_eq!(messages[0]["payload"]["joinCode"], "qrst");
        assert_eq!(session.surface().join_code.as_deref(), Some("QRST"));
    }

    #[test]
    fn test_click_selects_and_actions_clear_selection() {
        let (mut session, mut outbound, now) = in_match();

        let target = Hex::new(8, 9);
        let pixel = session.layout().axial_to_pixel(target);
        session.handle_input(LocalInput::ClickBoard(pixel), now).unwrap();
        assert_eq!(selected(&session), Some(target));

        session.handle_input(LocalInput::Move, now).unwrap();
        let messages = sent(&mut outbound);
        assert_eq!(messages[0]["type"], "send_player_move");
        assert_eq!(messages[0]["payload"]["hex"], json!({"r": 8, "q": 9}));
        assert_eq!(selected(&session), None);

        session.handle_input(LocalInput::Select(Some(target)), now).unwrap();
        session.handle_input(LocalInput::IncreaseRange, now).unwrap();
        assert_eq!(sent(&mut outbound)[0]["type"], "send_player_increase_range");
        assert_eq!(selected(&session), None);

        let opponent = Hex::new(8, 10);
        session.handle_input(LocalInput::Select(Some(opponent)), now).unwrap();
        session.handle_input(LocalInput::Shoot, now).unwrap();
        let messages = sent(&mut outbound);
        assert_eq!(messages[0]["type"], "send_player_shoot");
        assert_eq!(messages[0]["payload"]["hex"], json!({"r": 8, "q": 10}));
        assert_eq!(selected(&session), None);

        session.handle_input(LocalInput::Select(Some(opponent)), now).unwrap();
        session.handle_input(LocalInput::GiveActionPoint, now).unwrap();
        let messages = sent(&mut outbound);
        assert_eq!(
            messages[0],
            json!({
                "type": "send_player_give_action_point",
                "payload": {"playerID": "guest-a", "hex": {"r": 8, "q": 10}}
            })
        );
        assert_eq!(selected(&session), None);
    }

    #[test]
    fn test_failed_send_still_clears_selection() {
        let (mut session, outbound, now) = in_match();
        drop(outbound);

        session.handle_input(LocalInput::Select(Some(Hex::new(8, 9))), now).unwrap();
        let result = session.handle_input(LocalInput::Move, now);
        assert!(matches!(result, Err(SessionError::Transport(_))));
        assert_eq!(selected(&session), None);
    }

    #[test]
    fn test_click_off_board_clears_selection() {
        let (mut session, _outbound, now) = in_match();
        session.handle_input(LocalInput::Select(Some(Hex::new(8, 9))), now).unwrap();
        session.handle_input(LocalInput::ClickBoard(Point::new(0.0, 0.0)), now).unwrap();
        assert_eq!(selected(&session), None);

        // Inside the square index but outside the hexagon
        session.handle_input(LocalInput::Select(Some(Hex::new(0, 0))), now).unwrap();
        assert_eq!(selected(&session), None);
    }

    #[test]
    fn test_actions_without_target_show_notice() {
        let (mut session, mut outbound, now) = in_match();

        session.handle_input(LocalInput::Move, now).unwrap();
        assert_eq!(session.notice(), Some(SELECT_MOVE_TARGET));
        session.handle_input(LocalInput::Shoot, now).unwrap();
        assert_eq!(session.notice(), Some(SELECT_SHOOT_TARGET));
        session.handle_input(LocalInput::GiveActionPoint, now).unwrap();
        assert_eq!(session.surface().notice.as_deref(), Some(SELECT_GIFT_TARGET));
        assert!(sent(&mut outbound).is_empty());
    }

    #[test]
    fn test_eliminated_player_is_ignored() {
        let (mut session, mut outbound, now) = in_match();
        let state = game_state(vec![
            json!({"id": "guest-a", "color": "blue", "state": null}),
            player("guest-b", "red", 8, 10, 2),
        ]);
        session
            .handle_message(&frame("receive_player_shoot", json!({"gameState": state})), now)
            .unwrap();
        assert_eq!(session.surface().action_points.as_deref(), Some("X"));

        session.handle_input(LocalInput::Select(Some(Hex::new(8, 9))), now).unwrap();
        assert_eq!(selected(&session), None);
        session.handle_input(LocalInput::IncreaseRange, now).unwrap();
        assert!(sent(&mut outbound).is_empty());
    }

    #[test]
    fn test_rejection_is_a_timed_notice() {
        let (mut session, _outbound, now) = in_match();
        let before = session.reader().snapshot().unwrap();

        session
            .handle_message(&frame("receive_invalid_action", json!({"message": "out of range"})), now)
            .unwrap();
        assert_eq!(session.notice(), Some("out of range"));
        assert_eq!(session.reader().snapshot().unwrap(), before);
        assert_eq!(session.next_deadline(), Some(now + Duration::from_secs(2)));

        session.tick(now + Duration::from_secs(1)).unwrap();
        assert_eq!(session.surface().notice.as_deref(), Some("out of range"));
        session.tick(now + Duration::from_secs(2)).unwrap();
        assert_eq!(session.surface().notice, None);
        assert_eq!(session.next_deadline(), None);
    }

    #[test]
    fn test_win_then_game_over_then_leave() {
        let (mut session, _outbound, now) = in_match();
        let state = game_state(vec![
            player("guest-a", "blue", 8, 8, 3),
            json!({"id": "guest-b", "color": "red", "state": null}),
        ]);
        session
            .handle_message(
                &frame("receive_player_win", json!({"gameState": state, "playerColor": "blue"})),
                now,
            )
            .unwrap();
        assert_eq!(session.phase(), &ScreenPhase::InMatch);
        assert_eq!(session.surface().action_points.as_deref(), Some("3"));

        session.tick(now + Duration::from_millis(1500)).unwrap();
        assert_eq!(session.phase(), &ScreenPhase::InMatch);
        session.tick(now + Duration::from_secs(2)).unwrap();
        assert_eq!(session.phase(), &ScreenPhase::GameOver { winner_color: "blue".into() });

        session.handle_input(LocalInput::Leave, now).unwrap();
        assert_eq!(session.phase(), &ScreenPhase::ChooseStartOrJoin);
        assert!(session.reader().snapshot().is_none());
        assert!(session.board().is_none());
    }

    #[test]
    fn test_clock_tick() {
        let (mut session, _outbound) = session();
        session
            .handle_message(&frame("receive_clock_update", json!({"seconds": 65})), Instant::now())
            .unwrap();
        assert_eq!(session.surface().clock.as_deref(), Some("01:05"));
    }

    #[test]
    fn test_bad_frames_alert_and_change_nothing() {
        let (mut session, _outbound) = session();
        let now = Instant::now();

        let result = session.handle_message(r#"{"payload":{}}"#, now);
        assert!(matches!(result, Err(SessionError::Protocol(_))));
        let result = session.handle_message(&frame("receive_teleport", json!({})), now);
        assert!(matches!(result, Err(SessionError::Protocol(_))));

        assert_eq!(session.surface().alerts.len(), 2);
        assert_eq!(session.phase(), &ScreenPhase::ChooseStartOrJoin);
    }

    #[test]
    fn test_updates_outside_a_match_are_ignored() {
        let (mut session, _outbound) = session();
        session
            .handle_message(
                &frame("receive_player_move", json!({"gameState": two_players()})),
                Instant::now(),
            )
            .unwrap();
        assert!(session.reader().snapshot().is_none());
    }

    #[test]
    fn test_back_and_forward() {
        let (mut session, mut outbound) = session();
        let now = Instant::now();

        session.handle_input(LocalInput::ShowRules, now).unwrap();
        session.handle_input(LocalInput::Back, now).unwrap();
        assert_eq!(session.phase(), &ScreenPhase::ChooseStartOrJoin);
        session.handle_input(LocalInput::Forward, now).unwrap();
        assert_eq!(session.phase(), &ScreenPhase::Rules);
        assert!(sent(&mut outbound).is_empty());

        session.handle_input(LocalInput::Leave, now).unwrap();
        session.handle_input(LocalInput::NewGame, now).unwrap();
        session.handle_input(LocalInput::Back, now).unwrap();
        assert_eq!(sent(&mut outbound).len(), 1);

        // Coming back to the host screen asks the server again
        session.handle_input(LocalInput::Forward, now).unwrap();
        let messages = sent(&mut outbound);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["type"], "send_initialize_game");
    }

    #[test]
    fn test_back_restores_match_snapshot() {
        let (mut session, _outbound, now) = in_match();
        session.handle_input(LocalInput::Back, now).unwrap();
        assert!(matches!(session.phase(), ScreenPhase::Hosting { .. }));
        assert!(session.reader().snapshot().is_none());

        session.handle_input(LocalInput::Forward, now).unwrap();
        assert_eq!(session.phase(), &ScreenPhase::InMatch);
        assert_eq!(session.reader().snapshot().map(|s| s.player_count()), Some(2));
    }

    #[test]
    fn test_resize_relayouts_board() {
        let (mut session, _outbound, now) = in_match();
        let renders = session.surface().renders;

        session
            .handle_input(LocalInput::Resize { width: 400.0, height: 400.0 }, now)
            .unwrap();
        let center = session.board().and_then(|b| b.get(Hex::new(8, 8))).map(|c| c.center);
        assert_eq!(center, Some(session.layout().axial_to_pixel(Hex::new(8, 8))));
        assert!((session.layout().cell_radius - 200.0 / 17.0 / 1.9).abs() < 1e-9);
        assert_eq!(session.surface().renders, renders + 1);
    }

    #[test]
    fn test_quit() {
        let (mut session, _outbound) = session();
        assert_eq!(session.handle_input(LocalInput::Quit, Instant::now()).unwrap(), Flow::Quit);
    }
}
