//! Course feedback and student status updates.

use reqwest::Method;
use serde_json::json;

use super::types::{Feedback, StatusUpdate};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// One feedback per student per course; the backend rejects repeats.
    pub async fn leave_feedback(&self, course_id: i64, rating: i32, comment: Option<&str>) -> Result<Feedback, ApiError> {
        let body = json!({ "course": course_id, "rating": rating, "comment": comment });
        self.send_json(Method::POST, "feedback/feedbacks/", &body).await
    }

    /// Status updates, optionally narrowed to one student.
    pub async fn status_updates(&self, student_id: Option<i64>) -> Result<Vec<StatusUpdate>, ApiError> {
        match student_id {
            Some(id) => {
                self.get_json_query("feedback/status-updates/", &[("student_id", id)])
                    .await
            }
            None => self.get_json("feedback/status-updates/").await,
        }
    }

    pub async fn post_status_update(&self, content: &str) -> Result<StatusUpdate, ApiError> {
        self.send_json(Method::POST, "feedback/status-updates/", &json!({ "content": content }))
            .await
    }

    pub async fn delete_status_update(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("feedback/status-updates/{id}/")).await
    }
}

#[cfg(test)]
#[path = "feedback_test.rs"]
mod tests;
