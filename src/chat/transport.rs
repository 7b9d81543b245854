//! Realtime transport: handshake URLs and the per-connection socket pump.
//!
//! ARCHITECTURE
//! ============
//! A `Connector` turns a handshake URL into a `Connection`: two unbounded
//! channels, outbound text frames in and `TransportEvent`s out. The
//! production connector spawns one tokio task per connection that owns the
//! `tokio-tungstenite` stream.
//!
//! LIFECYCLE
//! =========
//! Dropping a `Connection` drops its outbound sender. The pump notices on
//! its next poll, sends a close frame (or abandons the handshake if still
//! connecting) and exits, so replacing a connection never leaves a second
//! socket running. Events the pump emits after that point have no receiver
//! and are discarded.

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::config::ClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid realtime endpoint `{0}`")]
    InvalidEndpoint(String),
}

/// Something the transport observed, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Text(String),
    Error(String),
    Closed,
}

/// Handle to one live transport. Owned by exactly one chat session.
#[derive(Debug)]
pub struct Connection {
    outbound: mpsc::UnboundedSender<String>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
}

impl Connection {
    #[must_use]
    pub fn new(outbound: mpsc::UnboundedSender<String>, events: mpsc::UnboundedReceiver<TransportEvent>) -> Self {
        Self { outbound, events }
    }

    /// Queue one text frame. Returns `false` once the pump has exited.
    pub fn send_text(&self, text: String) -> bool {
        self.outbound.send(text).is_ok()
    }

    /// Next event, or `None` when the pump is gone without saying why.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }
}

/// Opens transports. Implementations must not block.
pub trait Connector: Send + Sync {
    fn connect(&self, url: &str) -> Connection;
}

/// WebSocket connector backed by `tokio-tungstenite`.
///
/// `connect` spawns onto the current tokio runtime and panics outside one.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect(&self, url: &str) -> Connection {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_socket(url.to_owned(), outbound_rx, events_tx));
        Connection::new(outbound_tx, events_rx)
    }
}

async fn run_socket(
    url: String,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let connect = connect_async(url.as_str());
    tokio::pin!(connect);

    let stream = loop {
        tokio::select! {
            result = &mut connect => match result {
                Ok((stream, _)) => break stream,
                Err(e) => {
                    tracing::warn!(error = %e, "chat connect failed");
                    let _ = events.send(TransportEvent::Error(e.to_string()));
                    return;
                }
            },
            msg = outbound.recv() => {
                if msg.is_none() {
                    tracing::debug!("chat connection abandoned before open");
                    return;
                }
                tracing::debug!("dropping outbound frame queued before open");
            }
        }
    };

    let _ = events.send(TransportEvent::Opened);
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            msg = outbound.recv() => match msg {
                Some(text) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        tracing::warn!(error = %e, "chat send failed");
                        let _ = events.send(TransportEvent::Error(e.to_string()));
                        return;
                    }
                }
                None => {
                    let _ = sink.send(Message::Close(None)).await;
                    let _ = sink.close().await;
                    tracing::debug!("chat connection closed locally");
                    return;
                }
            },
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(TransportEvent::Text(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    tracing::debug!(len = bytes.len(), "dropping binary chat frame");
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(?frame, "chat connection closed by peer");
                    let _ = events.send(TransportEvent::Closed);
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "chat receive failed");
                    let _ = events.send(TransportEvent::Error(e.to_string()));
                    return;
                }
                None => {
                    let _ = events.send(TransportEvent::Closed);
                    return;
                }
            },
        }
    }
}

// =============================================================================
// HANDSHAKE
// =============================================================================

/// Realtime endpoint root, e.g. `wss://campus.example.edu:8081`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEndpoint {
    root: Url,
}

impl ChatEndpoint {
    pub fn new(root: &str) -> Result<Self, TransportError> {
        let root = Url::parse(root).map_err(|_| TransportError::InvalidEndpoint(root.to_owned()))?;
        if !matches!(root.scheme(), "ws" | "wss") || root.cannot_be_a_base() {
            return Err(TransportError::InvalidEndpoint(root.to_string()));
        }
        Ok(Self { root })
    }

    /// Derive the realtime root from an http(s) REST base URL: same host
    /// and port, `wss` for `https` and `ws` otherwise.
    pub fn from_base_url(base_url: &str) -> Result<Self, TransportError> {
        let mut url = Url::parse(base_url).map_err(|_| TransportError::InvalidEndpoint(base_url.to_owned()))?;
        let scheme = match url.scheme() {
            "https" => "wss",
            "http" => "ws",
            _ => return Err(TransportError::InvalidEndpoint(base_url.to_owned())),
        };
        url.set_scheme(scheme)
            .map_err(|()| TransportError::InvalidEndpoint(base_url.to_owned()))?;
        url.set_path("");
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self { root: url })
    }

    /// Explicit `ws_url` wins; otherwise derive from the REST base URL.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        match &config.ws_url {
            Some(ws_url) => Self::new(ws_url),
            None => Self::from_base_url(&config.base_url),
        }
    }

    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.root.scheme() == "wss"
    }

    /// `<root>/ws/chat/<room>/?token=<credential>`, with room and token
    /// percent-encoded.
    #[must_use]
    pub fn handshake_url(&self, room: &str, credential: &str) -> String {
        let mut url = self.root.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["ws", "chat", room, ""]);
        }
        url.set_query(None);
        url.query_pairs_mut().append_pair("token", credential);
        url.into()
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
