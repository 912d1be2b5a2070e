//! Error types for the wire protocol

/// Failures decoding inbound or encoding outbound messages
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("message is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("no type field in the event")]
    MissingType,

    #[error("unsupported message type '{0}'")]
    UnknownEvent(String),

    #[error("bad payload for '{kind}': {source}")]
    BadPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode outgoing message: {0}")]
    Encode(#[source] serde_json::Error),
}
