//! Message channel to the server
//!
//! Sending is fire-and-forget: text is queued and control returns at once.
//! Inbound frames arrive on a channel drained by the session loop.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::error::TransportError;

/// What the server side of the channel delivered
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    Message(String),
    Closed,
}

/// Outbound half of the channel
pub trait Transport {
    fn send(&mut self, text: String) -> Result<(), TransportError>;
}

/// Transport that queues frames on an unbounded channel
#[derive(Clone, Debug)]
pub struct ChannelTransport {
    tx: UnboundedSender<String>,
}

impl ChannelTransport {
    /// Transport plus the receiver its frames come out of
    pub fn pair() -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.tx.send(text).map_err(|_| TransportError::Closed)
    }
}

/// Reject URLs the bundled transport cannot open
pub fn check_url(url: &str) -> Result<(), TransportError> {
    match url.split_once("://") {
        Some(("ws", rest)) if !rest.is_empty() => Ok(()),
        Some((scheme, _)) => Err(TransportError::Unsupported(scheme.to_string())),
        None => Err(TransportError::Unsupported(url.to_string())),
    }
}

/// Open the WebSocket and pump it through channels.
///
/// Must be called inside a tokio runtime. The returned receiver yields
/// `TransportEvent::Closed` once, after which the connection is gone for good.
pub async fn connect(
    url: &str,
) -> Result<(ChannelTransport, UnboundedReceiver<TransportEvent>), TransportError> {
    check_url(url)?;

    let (stream, _response) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| TransportError::Connect(e.to_string()))?;
    info!("Connected to {}", url);

    let (mut sink, mut source) = stream.split();
    let (transport, mut outbound) = ChannelTransport::pair();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if let Err(e) = sink.send(Message::Text(text)).await {
                warn!("Failed to send frame: {}", e);
                break;
            }
        }
        debug!("Outbound pump stopped");
    });

    tokio::spawn(async move {
        while let Some(frame) = source.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    if inbound_tx.send(TransportEvent::Message(text)).is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("Connection error: {}", e);
                    break;
                }
            }
        }
        info!("Connection closed");
        let _ = inbound_tx.send(TransportEvent::Closed);
    });

    Ok((transport, inbound_rx))
}
