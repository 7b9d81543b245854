//! Wire types for the REST backend.
//!
//! Field names mirror the backend serializers. Unknown fields are ignored
//! and optional fields default, so a newer backend does not break parsing.

use serde::{Deserialize, Serialize};

// =============================================================================
// USERS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Teacher,
    #[serde(other)]
    Other,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub password: String,
    pub password2: String,
}

/// Body returned by `users/login/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: String,
}

// =============================================================================
// COURSES
// =============================================================================

/// The list endpoint nests the full teacher; the detail endpoint only
/// sends the teacher's display string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeacherRef {
    User(User),
    Name(String),
}

impl TeacherRef {
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            TeacherRef::User(user) => &user.username,
            TeacherRef::Name(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMaterial {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub course: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub course: i64,
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default)]
    pub student: Option<User>,
    #[serde(default)]
    pub date_enrolled: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    #[serde(default)]
    pub student: Option<String>,
    pub course: i64,
    #[serde(default)]
    pub course_title: Option<String>,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub teacher: Option<TeacherRef>,
    #[serde(default)]
    pub materials: Vec<CourseMaterial>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
    #[serde(default)]
    pub feedbacks: Vec<Feedback>,
}

impl Course {
    #[must_use]
    pub fn teacher_name(&self) -> &str {
        self.teacher.as_ref().map_or("Unknown", TeacherRef::username)
    }

    #[must_use]
    pub fn is_enrolled(&self, user_id: i64) -> bool {
        self.enrollments
            .iter()
            .any(|e| e.student.as_ref().is_some_and(|s| s.id == user_id))
    }
}

// =============================================================================
// FEEDBACK / STATUS / NOTIFICATIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub id: i64,
    #[serde(default)]
    pub student: Option<String>,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

// =============================================================================
// CHAT (REST side)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: i64,
    #[serde(default)]
    pub room: Option<i64>,
    #[serde(default)]
    pub sender: Option<User>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course: Option<i64>,
    #[serde(default)]
    pub participants: Vec<User>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
