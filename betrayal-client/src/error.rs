//! Error types for transport and session handling

use betrayal_core::ProtocolError;

/// Failures of the message channel to the server
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport '{0}' is not supported, use a ws:// url")]
    Unsupported(String),

    #[error("failed to connect: {0}")]
    Connect(String),

    #[error("connection is closed")]
    Closed,
}

/// Failures surfaced by the session driver
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("navigation history entry is unreadable: {0}")]
    History(#[from] serde_json::Error),

    #[error("connection to the server was closed")]
    ConnectionClosed,
}
