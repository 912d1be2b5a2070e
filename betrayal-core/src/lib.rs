//! Betrayal Core - Board geometry, match model and wire protocol
//!
//! This crate provides the pure half of the game client:
//! - Hex geometry (axial coordinates, rings, discs, cube rounding)
//! - Pixel layout of the board and the clipped board index
//! - Player and match state mirrored from the server
//! - Typed wire messages exchanged with the server

pub mod board;
pub mod error;
pub mod hex;
pub mod layout;
pub mod player;
pub mod protocol;
pub mod state;

// Re-exports for convenient access
pub use board::{Board, Cell, DEFAULT_BOARD_SIZE};
pub use error::ProtocolError;
pub use hex::{disc, ring, Hex, DIRECTIONS};
pub use layout::{Layout, Point};
pub use player::{Player, PlayerState};
pub use protocol::{ClientIntent, ServerEvent, Snapshot};
pub use state::{MatchState, MatchStatus};
