use std::collections::HashMap;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use super::*;
use crate::api::types::Role;
use crate::session::{AuthTokens, SessionContext};
use crate::test_support::{api_client, spawn_backend, user};

async fn rooms() -> Json<Value> {
    Json(json!([
        { "id": 1, "name": "dashboard_chat", "participants": [user(1, "alice", Role::Student)] },
        { "id": 2, "name": "Rust", "course": 3, "is_private": false }
    ]))
}

async fn messages(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let room = q.get("room").and_then(|r| r.parse::<i64>().ok());
    Json(json!([
        { "id": 10, "room": room, "sender": user(1, "alice", Role::Student), "content": "hi", "timestamp": "2025-01-01T10:00:00Z" },
        { "id": 11, "room": room, "content": "left" }
    ]))
}

async fn backend() -> String {
    let router = Router::new()
        .route("/api/chat/rooms/", get(rooms))
        .route("/api/chat/messages/", get(messages));
    spawn_backend(router).await
}

fn authed() -> SessionContext {
    let session = SessionContext::new();
    session.set_tokens(AuthTokens { access: "good".into(), refresh: None });
    session
}

#[tokio::test]
async fn chat_rooms_tolerate_missing_fields() {
    let client = api_client(&backend().await, authed());
    let rooms = client.chat_rooms().await.unwrap();
    assert_eq!(rooms.len(), 2);
    assert_eq!(rooms[0].participants[0].username, "alice");
    assert_eq!(rooms[1].course, Some(3));
    assert!(rooms[1].participants.is_empty());
}

#[tokio::test]
async fn chat_messages_query_by_room() {
    let client = api_client(&backend().await, authed());
    let history = client.chat_messages(5).await.unwrap();
    assert!(history.iter().all(|m| m.room == Some(5)));
    assert_eq!(history[0].sender.as_ref().map(|u| u.username.as_str()), Some("alice"));
    assert!(history[1].sender.is_none());
}
