//! Shared fixtures for tests that need a live backend.

use axum::Router;

use crate::api::ApiClient;
use crate::api::types::{Role, User};
use crate::config::ClientConfig;
use crate::session::SessionContext;

/// Serve `router` on an ephemeral local port and return its `http://` root.
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test backend failed");
    });
    format!("http://{addr}")
}

pub fn api_client(root: &str, session: SessionContext) -> ApiClient {
    let config = ClientConfig { base_url: format!("{root}/api/"), ..ClientConfig::default() };
    ApiClient::new(&config, session).expect("api client should build")
}

pub fn user(id: i64, username: &str, role: Role) -> User {
    User {
        id,
        username: username.to_owned(),
        email: format!("{username}@campus.test"),
        role,
        bio: None,
        profile_picture: None,
    }
}
