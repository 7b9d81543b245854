//! Chat session: one realtime connection bound to a room and a credential.
//!
//! STATE MACHINE
//! =============
//! ```text
//! disconnected --open--> connecting --Opened--> connected
//!      ^                     |                      |
//!      +------ Error/Closed -+---- Error/Closed ----+
//! ```
//! `close` forces `disconnected` from any state. `connecting` has no
//! timeout; an attempt that never completes stays there until `close` or
//! another `open`.
//!
//! FAILURE SEMANTICS
//! =================
//! Nothing here returns an error. Malformed inbound frames are logged and
//! dropped, transport failures become `disconnected`, and sends that fail
//! a precondition do nothing. Callers read `status()` to decide whether
//! sending is possible.
//!
//! SCHEDULING
//! ==========
//! The session is `&mut self` throughout and is driven by one task calling
//! `recv`. `open` and `send` never wait on the network.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::message::{ChatMessage, ConnectionStatus, encode_outbound, parse_inbound};
use super::reconnect::ReconnectPolicy;
use super::transport::{ChatEndpoint, Connection, Connector, TransportEvent};

/// What to do when the backend echoes one's own message back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EchoPolicy {
    /// Append the echo like any other message; duplicates are possible.
    #[default]
    Keep,
    /// Confirm the oldest matching optimistic entry in place instead of
    /// appending. Matches on sender name and body.
    Reconcile,
}

/// Observable effect of one processed transport event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatUpdate {
    Status(ConnectionStatus),
    /// A message was appended to the sequence.
    Message(ChatMessage),
    /// The optimistic entry at this index was confirmed by the server echo.
    Confirmed(usize),
    /// An inbound frame failed to parse and was dropped.
    Discarded,
    /// A dropped connection is being reopened after `delay`.
    Reconnecting { attempt: u32, delay: Duration },
}

/// A reopen that fires at `at`, whichever `recv` call is waiting then.
#[derive(Debug, Clone, Copy)]
struct PendingRetry {
    at: Instant,
    attempt: u32,
    delay: Duration,
}

#[derive(Debug, Clone)]
struct Target {
    credential: String,
    room: String,
}

pub struct ChatSession {
    endpoint: ChatEndpoint,
    connector: Arc<dyn Connector>,
    display_name: String,
    echo: EchoPolicy,
    reconnect: ReconnectPolicy,

    status: ConnectionStatus,
    messages: Vec<ChatMessage>,
    input: String,
    connection: Option<Connection>,
    target: Option<Target>,
    attempts: u32,
    retry: Option<PendingRetry>,
}

impl ChatSession {
    #[must_use]
    pub fn new(endpoint: ChatEndpoint, connector: Arc<dyn Connector>, display_name: impl Into<String>) -> Self {
        Self {
            endpoint,
            connector,
            display_name: display_name.into(),
            echo: EchoPolicy::default(),
            reconnect: ReconnectPolicy::disabled(),
            status: ConnectionStatus::Disconnected,
            messages: Vec::new(),
            input: String::new(),
            connection: None,
            target: None,
            attempts: 0,
            retry: None,
        }
    }

    #[must_use]
    pub fn with_echo_policy(mut self, echo: EchoPolicy) -> Self {
        self.echo = echo;
        self
    }

    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn room(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.room.as_str())
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Whether the send affordance should be enabled.
    #[must_use]
    pub fn can_send(&self) -> bool {
        self.status == ConnectionStatus::Connected
            && self.connection.is_some()
            && self.target.as_ref().is_some_and(|t| !t.credential.is_empty())
    }

    // =========================================================================
    // OPEN / CLOSE
    // =========================================================================

    /// Start connecting to `room`. Any previous connection is closed first.
    /// An empty credential leaves the session untouched.
    pub fn open(&mut self, credential: &str, room: &str) {
        if credential.is_empty() {
            tracing::debug!(room, "chat open skipped: no credential");
            return;
        }
        self.drop_connection();
        self.target = Some(Target { credential: credential.to_owned(), room: room.to_owned() });
        self.attempts = 0;
        self.retry = None;
        self.connect_target();
    }

    /// Tear down the connection, if any, and cancel pending reconnects.
    pub fn close(&mut self) {
        if self.connection.is_some() {
            tracing::info!(room = self.room(), "chat connection closed");
        }
        self.drop_connection();
        self.target = None;
        self.retry = None;
        self.status = ConnectionStatus::Disconnected;
    }

    fn connect_target(&mut self) {
        let Some(target) = &self.target else {
            return;
        };
        let url = self.endpoint.handshake_url(&target.room, &target.credential);
        self.status = ConnectionStatus::Connecting;
        tracing::info!(room = %target.room, secure = self.endpoint.is_secure(), "opening chat connection");
        self.connection = Some(self.connector.connect(&url));
    }

    fn drop_connection(&mut self) {
        self.connection = None;
    }

    // =========================================================================
    // SEND
    // =========================================================================

    /// Send `text` and append an optimistic local copy. Does nothing unless
    /// connected and `text` has non-whitespace content.
    pub fn send(&mut self, text: &str) {
        let body = text.trim();
        if body.is_empty() || !self.can_send() {
            tracing::trace!(status = %self.status, empty = body.is_empty(), "chat send skipped");
            return;
        }
        let Some(connection) = &self.connection else {
            return;
        };
        let payload = match encode_outbound(body) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "chat payload encode failed");
                return;
            }
        };
        if !connection.send_text(payload) {
            tracing::debug!("chat send skipped: transport already gone");
            return;
        }

        self.messages.push(ChatMessage::local(&self.display_name, body));
        self.input.clear();
    }

    /// Send the pending input buffer.
    pub fn submit_input(&mut self) {
        let text = self.input.clone();
        self.send(&text);
    }

    // =========================================================================
    // INBOUND
    // =========================================================================

    /// Wait for the next transport event and apply it.
    ///
    /// Returns `None` when there is no connection and no reconnect is
    /// pending. Dropping the returned future is safe: the reconnect
    /// deadline is fixed when the connection drops, so the next call only
    /// waits out whatever remains of it.
    pub async fn recv(&mut self) -> Option<ChatUpdate> {
        if self.connection.is_none() {
            return self.reconnect_if_pending().await;
        }
        let event = match self.connection.as_mut() {
            Some(connection) => connection.next_event().await,
            None => return None,
        };
        Some(self.handle_event(event.unwrap_or(TransportEvent::Closed)))
    }

    /// Apply one event from the live connection.
    pub(crate) fn handle_event(&mut self, event: TransportEvent) -> ChatUpdate {
        match event {
            TransportEvent::Opened => {
                self.status = ConnectionStatus::Connected;
                self.attempts = 0;
                tracing::info!(room = self.room(), "chat connected");
                ChatUpdate::Status(self.status)
            }
            TransportEvent::Text(raw) => self.handle_text(&raw),
            TransportEvent::Error(reason) => {
                tracing::warn!(room = self.room(), %reason, "chat transport error");
                self.on_dropped()
            }
            TransportEvent::Closed => {
                tracing::info!(room = self.room(), "chat transport closed");
                self.on_dropped()
            }
        }
    }

    fn handle_text(&mut self, raw: &str) -> ChatUpdate {
        let message = match parse_inbound(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, len = raw.len(), "discarding malformed chat frame");
                return ChatUpdate::Discarded;
            }
        };

        if self.echo == EchoPolicy::Reconcile && message.user == self.display_name {
            let pending = self
                .messages
                .iter()
                .position(|m| m.local && m.message == message.message);
            if let Some(index) = pending {
                let entry = &mut self.messages[index];
                entry.local = false;
                if message.timestamp.is_some() {
                    entry.timestamp = message.timestamp;
                }
                return ChatUpdate::Confirmed(index);
            }
        }

        self.messages.push(message.clone());
        ChatUpdate::Message(message)
    }

    fn on_dropped(&mut self) -> ChatUpdate {
        self.drop_connection();
        self.status = ConnectionStatus::Disconnected;
        self.retry = None;
        if self.target.is_some() && self.reconnect.allows(self.attempts) {
            let attempt = self.attempts;
            let delay = self.reconnect.delay(attempt);
            tracing::info!(room = self.room(), attempt, ?delay, "scheduling chat reconnect");
            self.retry = Some(PendingRetry { at: Instant::now() + delay, attempt, delay });
        }
        ChatUpdate::Status(self.status)
    }

    async fn reconnect_if_pending(&mut self) -> Option<ChatUpdate> {
        let retry = self.retry?;
        if self.target.is_none() {
            self.retry = None;
            return None;
        }
        tokio::time::sleep_until(retry.at).await;

        self.retry = None;
        let PendingRetry { attempt, delay, .. } = retry;
        self.attempts = attempt.saturating_add(1);
        self.connect_target();
        Some(ChatUpdate::Reconnecting { attempt, delay })
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
