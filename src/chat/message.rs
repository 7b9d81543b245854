//! Chat message model and the realtime wire payloads.
//!
//! DESIGN
//! ======
//! Outbound frames carry exactly one field, `{"message": "<body>"}`; the
//! backend stamps sender and time itself. Inbound frames are read
//! leniently: any JSON object is accepted and missing fields fall back to
//! placeholders, while anything that is not a JSON object is rejected so
//! the session can drop it.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const UNKNOWN_SENDER: &str = "Unknown";

/// Realtime connection lifecycle as shown on the status badge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the session's message sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub user: String,
    pub message: String,
    pub timestamp: Option<String>,
    /// Set on optimistic entries created by a local send.
    pub local: bool,
}

impl ChatMessage {
    /// Optimistic copy of an outbound message, stamped with local time.
    #[must_use]
    pub fn local(user: &str, message: &str) -> Self {
        Self {
            user: user.to_owned(),
            message: message.to_owned(),
            timestamp: now_rfc3339(),
            local: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    message: &'a str,
}

/// Encode the outbound payload for `body`.
pub fn encode_outbound(body: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&OutboundMessage { message: body })
}

#[derive(Debug, thiserror::Error)]
pub enum InboundError {
    #[error("payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// Parse one inbound frame.
///
/// Sender comes from `sender.username`, then a flat `user`; body from
/// `content`, then `message`. Empty or missing senders read as `Unknown`.
pub fn parse_inbound(raw: &str) -> Result<ChatMessage, InboundError> {
    let value = serde_json::from_str::<Value>(raw)?;
    let Some(data) = value.as_object() else {
        return Err(InboundError::NotAnObject);
    };

    let user = data
        .get("sender")
        .and_then(|s| s.get("username"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| data.get("user").and_then(Value::as_str).filter(|s| !s.is_empty()))
        .unwrap_or(UNKNOWN_SENDER)
        .to_owned();

    let message = data
        .get("content")
        .and_then(Value::as_str)
        .or_else(|| data.get("message").and_then(Value::as_str))
        .unwrap_or_default()
        .to_owned();

    let timestamp = match data.get("timestamp") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    Ok(ChatMessage { user, message, timestamp, local: false })
}

fn now_rfc3339() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
