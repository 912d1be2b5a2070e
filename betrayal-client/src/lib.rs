//! Betrayal Client - Session runtime for the game client
//!
//! This crate hosts one player's connection to a match server:
//! - WebSocket transport and the persisted player identity
//! - Atomic store for the latest authoritative match snapshot
//! - Screen phases with restorable navigation history
//! - The session driver tying input, protocol events and rendering together

pub mod config;
pub mod error;
pub mod identity;
pub mod notice;
pub mod screen;
pub mod session;
pub mod store;
pub mod surface;
pub mod transport;

// Re-exports for convenient access
pub use config::ClientConfig;
pub use error::{SessionError, TransportError};
pub use identity::{player_id, FileStore, KeyValueStore, MemoryStore};
pub use screen::{ScreenMachine, ScreenPhase, Trigger};
pub use session::{Flow, LocalInput, Session};
pub use store::{MatchReader, MatchStore};
pub use surface::{RecordingSurface, Surface};
pub use transport::{connect, ChannelTransport, Transport, TransportEvent};
