//! Per-user notifications.

use reqwest::Method;
use serde_json::json;

use super::types::Notification;
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Newest first, as ordered by the backend.
    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.get_json("notifications/notifications/").await
    }

    pub async fn mark_notification_read(&self, id: i64) -> Result<Notification, ApiError> {
        self.send_json(
            Method::PATCH,
            &format!("notifications/notifications/{id}/"),
            &json!({ "is_read": true }),
        )
        .await
    }
}

#[cfg(test)]
#[path = "notifications_test.rs"]
mod tests;
