//! Wire protocol between client and server
//!
//! Every message is a JSON object `{ "type": ..., "payload": {...} }`.
//! Outbound intents and inbound events are closed enums keyed by `type`, so
//! handling code matches them exhaustively.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::hex::Hex;
use crate::player::Player;
use crate::state::MatchStatus;

// ============================================================================
// OUTBOUND
// ============================================================================

/// An intent sent by the local player
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientIntent {
    #[serde(rename = "send_initialize_game")]
    InitializeMatch {
        #[serde(rename = "playerID")]
        player_id: String,
    },
    #[serde(rename = "send_join_game")]
    JoinByCode {
        #[serde(rename = "playerID")]
        player_id: String,
        #[serde(rename = "joinCode")]
        join_code: String,
    },
    #[serde(rename = "send_start_game")]
    StartMatch {
        #[serde(rename = "playerID")]
        player_id: String,
    },
    #[serde(rename = "send_player_move")]
    Move {
        #[serde(rename = "playerID")]
        player_id: String,
        hex: Hex,
    },
    #[serde(rename = "send_player_shoot")]
    Shoot {
        #[serde(rename = "playerID")]
        player_id: String,
        hex: Hex,
    },
    #[serde(rename = "send_player_increase_range")]
    IncreaseRange {
        #[serde(rename = "playerID")]
        player_id: String,
    },
    #[serde(rename = "send_player_give_action_point")]
    GiveActionPoint {
        #[serde(rename = "playerID")]
        player_id: String,
        hex: Hex,
    },
}

impl ClientIntent {
    /// Wire name of this intent
    pub fn kind(&self) -> &'static str {
        match self {
            ClientIntent::InitializeMatch { .. } => "send_initialize_game",
            ClientIntent::JoinByCode { .. } => "send_join_game",
            ClientIntent::StartMatch { .. } => "send_start_game",
            ClientIntent::Move { .. } => "send_player_move",
            ClientIntent::Shoot { .. } => "send_player_shoot",
            ClientIntent::IncreaseRange { .. } => "send_player_increase_range",
            ClientIntent::GiveActionPoint { .. } => "send_player_give_action_point",
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

// ============================================================================
// INBOUND
// ============================================================================

/// Full match description carried by state-bearing events
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub players: HashMap<String, Player>,
    #[serde(default)]
    pub status: MatchStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInitialized {
    pub join_code: String,
    #[serde(default)]
    pub sent: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerJoined {
    pub player_count: u32,
    /// Older servers only notify the host and leave this out
    #[serde(default)]
    pub is_main_client: Option<bool>,
    #[serde(default)]
    pub sent: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateUpdate {
    pub game_state: Snapshot,
    #[serde(default)]
    pub sent: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionRejected {
    pub message: String,
    #[serde(default)]
    pub sent: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWon {
    pub game_state: Snapshot,
    pub player_color: String,
    #[serde(default)]
    pub sent: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClockTick {
    pub seconds: u32,
    #[serde(default)]
    pub sent: Option<String>,
}

/// An event pushed by the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerEvent {
    #[serde(rename = "receive_initialize_game")]
    MatchInitialized(MatchInitialized),
    #[serde(rename = "receive_join_game")]
    PlayerJoined(PlayerJoined),
    #[serde(rename = "receive_start_game")]
    MatchStarted(StateUpdate),
    #[serde(rename = "receive_player_move")]
    PlayerMoved(StateUpdate),
    #[serde(rename = "receive_player_shoot")]
    PlayerShot(StateUpdate),
    #[serde(rename = "receive_player_increase_range")]
    RangeIncreased(StateUpdate),
    #[serde(rename = "receive_player_give_action_point")]
    ActionPointGiven(StateUpdate),
    #[serde(rename = "receive_action_point")]
    ActionPointAwarded(StateUpdate),
    #[serde(rename = "receive_invalid_action")]
    ActionRejected(ActionRejected),
    #[serde(rename = "receive_player_win")]
    PlayerWon(PlayerWon),
    #[serde(rename = "receive_clock_update")]
    ClockTick(ClockTick),
}

impl ServerEvent {
    /// Every `type` string the client understands
    pub const KINDS: [&'static str; 11] = [
        "receive_initialize_game",
        "receive_join_game",
        "receive_start_game",
        "receive_player_move",
        "receive_player_shoot",
        "receive_player_increase_range",
        "receive_player_give_action_point",
        "receive_action_point",
        "receive_invalid_action",
        "receive_player_win",
        "receive_clock_update",
    ];

    /// Wire name of this event
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::MatchInitialized(_) => "receive_initialize_game",
            ServerEvent::PlayerJoined(_) => "receive_join_game",
            ServerEvent::MatchStarted(_) => "receive_start_game",
            ServerEvent::PlayerMoved(_) => "receive_player_move",
            ServerEvent::PlayerShot(_) => "receive_player_shoot",
            ServerEvent::RangeIncreased(_) => "receive_player_increase_range",
            ServerEvent::ActionPointGiven(_) => "receive_player_give_action_point",
            ServerEvent::ActionPointAwarded(_) => "receive_action_point",
            ServerEvent::ActionRejected(_) => "receive_invalid_action",
            ServerEvent::PlayerWon(_) => "receive_player_win",
            ServerEvent::ClockTick(_) => "receive_clock_update",
        }
    }

    /// Decode one inbound text frame.
    ///
    /// Distinguishes a frame with no `type` from one whose `type` is unknown
    /// and from a known type with an unusable payload.
    pub fn decode(text: &str) -> Result<ServerEvent, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(ProtocolError::InvalidJson)?;

        let kind = match value.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            _ => return Err(ProtocolError::MissingType),
        };

        if !Self::KINDS.contains(&kind.as_str()) {
            return Err(ProtocolError::UnknownEvent(kind));
        }

        serde_json::from_value(value).map_err(|source| ProtocolError::BadPayload { kind, source })
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}
