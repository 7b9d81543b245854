//! Registration, login, token refresh, and user lookups.

use reqwest::Method;
use serde_json::json;

use super::types::{LoginResponse, RefreshResponse, RegisterRequest, User};
use super::{ApiClient, ApiError, check_status};
use crate::session::AuthTokens;

/// Minimum query length the backend's user search accepts.
pub const MIN_SEARCH_LEN: usize = 2;

impl ApiClient {
    pub async fn register(&self, request: &RegisterRequest) -> Result<serde_json::Value, ApiError> {
        self.send_json(Method::POST, "users/register/", request).await
    }

    /// Log in by username or email. Stores the issued tokens and the
    /// returned user in the session context.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<User>, ApiError> {
        let url = self.url("users/login/");
        let body = json!({ "username": username, "password": password });
        let response = self.http.post(&url).json(&body).send().await?;
        let login = check_status(response).await?.json::<LoginResponse>().await?;

        self.session.set_tokens(AuthTokens { access: login.access, refresh: login.refresh });
        if let Some(user) = &login.user {
            self.session.set_user(user.clone());
        }
        self.session.persist()?;

        tracing::info!(
            user = login.user.as_ref().map(|u| u.username.as_str()),
            role = login.user.as_ref().map(|u| u.role.as_str()),
            "logged in"
        );
        Ok(login.user)
    }

    /// Exchange the refresh token for a new access token. On any failure
    /// the session is cleared before the error is returned.
    pub async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let Some(refresh) = self.session.refresh_token() else {
            return Err(ApiError::Unauthenticated);
        };

        let url = self.url("users/token/refresh/");
        let result = async {
            let response = self.http.post(&url).json(&json!({ "refresh": refresh })).send().await?;
            let body = check_status(response).await?.json::<RefreshResponse>().await?;
            Ok::<_, ApiError>(body.access)
        }
        .await;

        match result {
            Ok(access) => {
                self.session.set_access_token(access.clone());
                self.session.persist()?;
                tracing::debug!("access token refreshed");
                Ok(access)
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed; clearing session");
                self.session.clear()?;
                Err(e)
            }
        }
    }

    /// Logging out is client-side only: the tokens are simply forgotten.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.clear()?;
        tracing::info!("logged out");
        Ok(())
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json("users/me/").await
    }

    /// Startup flow: re-validate persisted tokens and load the profile.
    ///
    /// Returns `None` when there is no usable session. A rejected token is
    /// refreshed once (inside `execute`); if the backend still refuses, the
    /// session is cleared. A transport failure on the profile fetch is
    /// returned and keeps the stored tokens; a refresh that fails for any
    /// reason, transport included, has already cleared them.
    pub async fn restore_user(&self) -> Result<Option<User>, ApiError> {
        if !self.session.is_authenticated() {
            return Ok(None);
        }

        let user = match self.current_user().await {
            Ok(user) => user,
            Err(ApiError::Http(e)) => return Err(ApiError::Http(e)),
            Err(e) => {
                tracing::warn!(error = %e, "stored session rejected; clearing");
                self.session.clear()?;
                return Ok(None);
            }
        };

        self.session.set_user(user.clone());
        self.session.persist()?;
        Ok(Some(user))
    }

    pub async fn user_profile(&self, user_id: i64) -> Result<User, ApiError> {
        self.get_json(&format!("users/{user_id}/")).await
    }

    /// Teacher-only search by username or email. Short queries return
    /// nothing without a round trip, matching the backend's own cutoff.
    pub async fn search_users(&self, query: &str) -> Result<Vec<User>, ApiError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }
        self.get_json_query("users/search/", &[("q", query)]).await
    }
}
