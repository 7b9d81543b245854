//! Native client for the campus e-learning backend.
//!
//! ARCHITECTURE
//! ============
//! - `session`: injected auth/profile context shared by everything below.
//! - `api`: typed REST calls (auth, courses, feedback, notifications, chat
//!   history).
//! - `chat`: the realtime chat session.
//! - `config`: environment-driven defaults for all of the above.

pub mod api;
pub mod chat;
pub mod config;
pub mod session;

#[cfg(test)]
mod test_support;
