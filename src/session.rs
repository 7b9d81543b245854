//! Session context: the current credentials and user profile.
//!
//! DESIGN
//! ======
//! One `SessionContext` is created at startup and handed to every consumer
//! (REST client, chat, CLI). Clones share the same inner state, so a token
//! refresh made by the REST client is immediately visible to the next chat
//! `open`. `clear` is the logout path and also removes the persisted file.
//!
//! The optional JSON file plays the role browser local storage plays for a
//! web client: tokens survive between CLI invocations.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::api::types::User;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Bearer credentials issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default)]
    tokens: Option<AuthTokens>,
    #[serde(default)]
    user: Option<User>,
}

#[derive(Debug, Default)]
struct SessionInner {
    stored: StoredSession,
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<SessionInner>>,
}

impl SessionContext {
    /// An empty, memory-only session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a session backed by `path`. A missing file yields an empty
    /// session that will be written on the next `persist`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let stored = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => StoredSession::default(),
            Ok(raw) => serde_json::from_str::<StoredSession>(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoredSession::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), has_tokens = stored.tokens.is_some(), "session loaded");
        Ok(Self { inner: Arc::new(RwLock::new(SessionInner { stored, path: Some(path) })) })
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionInner> {
        self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionInner> {
        self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        self.read().path.clone()
    }

    /// The bearer credential for the next request, if logged in.
    #[must_use]
    pub fn current_access_token(&self) -> Option<String> {
        self.read()
            .stored
            .tokens
            .as_ref()
            .map(|t| t.access.clone())
            .filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read().stored.tokens.as_ref().and_then(|t| t.refresh.clone())
    }

    #[must_use]
    pub fn tokens(&self) -> Option<AuthTokens> {
        self.read().stored.tokens.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current_access_token().is_some()
    }

    pub fn set_tokens(&self, tokens: AuthTokens) {
        self.write().stored.tokens = Some(tokens);
    }

    /// Replace only the access token, keeping the refresh token.
    pub fn set_access_token(&self, access: String) {
        let mut inner = self.write();
        match inner.stored.tokens.as_mut() {
            Some(tokens) => tokens.access = access,
            None => inner.stored.tokens = Some(AuthTokens { access, refresh: None }),
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read().stored.user.clone()
    }

    pub fn set_user(&self, user: User) {
        self.write().stored.user = Some(user);
    }

    /// Write the session to its backing file. No-op for memory-only sessions.
    pub fn persist(&self) -> Result<(), SessionError> {
        let inner = self.read();
        let Some(path) = inner.path.as_deref() else {
            return Ok(());
        };
        write_session_file(path, &inner.stored)
    }

    /// Drop tokens and user, and delete the backing file.
    pub fn clear(&self) -> Result<(), SessionError> {
        let mut inner = self.write();
        inner.stored = StoredSession::default();
        if let Some(path) = inner.path.as_deref() {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        tracing::debug!("session cleared");
        Ok(())
    }
}

fn write_session_file(path: &Path, stored: &StoredSession) -> Result<(), SessionError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let rendered = serde_json::to_string_pretty(stored)?;
    std::fs::write(path, rendered)?;
    Ok(())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
