//! REST client for the e-learning backend.
//!
//! ARCHITECTURE
//! ============
//! `ApiClient` owns one `reqwest::Client` and a shared `SessionContext`.
//! Endpoint groups live in sibling modules (`auth`, `courses`, `feedback`,
//! `notifications`, `chat`) as additional `impl ApiClient` blocks, so each
//! file reads like one page's worth of backend calls.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become `ApiError::Status` carrying the raw body, which
//! for this backend is usually a field-keyed validation map. A 401 on an
//! authenticated call triggers exactly one refresh-and-retry; a failed
//! refresh clears the session so the caller falls back to logged-out.

pub mod auth;
pub mod chat;
pub mod courses;
pub mod feedback;
pub mod notifications;
pub mod types;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{ClientConfig, ConfigError, normalize_base_url};
use crate::session::{SessionContext, SessionError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("not logged in")]
    Unauthenticated,
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("file read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// HTTP status for server-side rejections.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: SessionContext) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        let base_url = normalize_base_url(&config.base_url)?;
        Ok(Self { http, base_url, session })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        match self.session.current_access_token() {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {token}"))?;
                Ok(request.header(AUTHORIZATION, value))
            }
            None => Ok(request),
        }
    }

    /// Send a request built by `build`, refreshing and rebuilding once if
    /// the backend rejects the access token.
    pub(crate) async fn execute<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let response = self.authorize(build(&self.http))?.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED && self.session.refresh_token().is_some() {
            tracing::info!("access token rejected; attempting refresh");
            self.refresh_access_token().await?;
            let retry = self.authorize(build(&self.http))?.send().await?;
            return check_status(retry).await;
        }
        check_status(response).await
    }

    pub(crate) async fn get_json<T>(&self, path: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self.execute(|http| http.get(&url)).await?;
        Ok(response.json::<T>().await?)
    }

    pub(crate) async fn get_json_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path);
        let response = self.execute(|http| http.get(&url).query(query)).await?;
        Ok(response.json::<T>().await?)
    }

    pub(crate) async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let response = self
            .execute(|http| http.request(method.clone(), &url).json(body))
            .await?;
        Ok(response.json::<T>().await?)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        self.execute(|http| http.delete(&url)).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), %body, "request rejected");
    Err(ApiError::Status { status: status.as_u16(), body })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
