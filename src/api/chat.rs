//! Chat rooms and stored message history over REST.
//!
//! The live connection is `crate::chat`; these calls only read what the
//! backend persisted.

use super::types::{ChatRoom, StoredMessage};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Rooms the caller participates in.
    pub async fn chat_rooms(&self) -> Result<Vec<ChatRoom>, ApiError> {
        self.get_json("chat/rooms/").await
    }

    pub async fn chat_messages(&self, room_id: i64) -> Result<Vec<StoredMessage>, ApiError> {
        self.get_json_query("chat/messages/", &[("room", room_id)]).await
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
