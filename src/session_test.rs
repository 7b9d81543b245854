use super::*;
use crate::api::types::Role;

fn user() -> User {
    User {
        id: 5,
        username: "bea".into(),
        email: "bea@campus.test".into(),
        role: Role::Student,
        bio: None,
        profile_picture: None,
    }
}

fn tokens(access: &str) -> AuthTokens {
    AuthTokens { access: access.into(), refresh: Some("refresh-1".into()) }
}

// =============================================================================
// In-memory behavior
// =============================================================================

#[test]
fn new_session_is_anonymous() {
    let session = SessionContext::new();
    assert!(session.current_access_token().is_none());
    assert!(session.user().is_none());
    assert!(!session.is_authenticated());
}

#[test]
fn clones_share_state() {
    let a = SessionContext::new();
    let b = a.clone();
    a.set_tokens(tokens("tokA"));
    assert_eq!(b.current_access_token().as_deref(), Some("tokA"));
}

#[test]
fn set_access_token_keeps_refresh() {
    let session = SessionContext::new();
    session.set_tokens(tokens("old"));
    session.set_access_token("new".into());
    let t = session.tokens().unwrap();
    assert_eq!(t.access, "new");
    assert_eq!(t.refresh.as_deref(), Some("refresh-1"));
}

#[test]
fn empty_access_token_is_not_a_credential() {
    let session = SessionContext::new();
    session.set_tokens(AuthTokens { access: String::new(), refresh: None });
    assert!(session.current_access_token().is_none());
}

#[test]
fn clear_drops_everything() {
    let session = SessionContext::new();
    session.set_tokens(tokens("tokA"));
    session.set_user(user());
    session.clear().unwrap();
    assert!(session.tokens().is_none());
    assert!(session.user().is_none());
}

// =============================================================================
// File persistence
// =============================================================================

#[test]
fn load_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let session = SessionContext::load(dir.path().join("session.json")).unwrap();
    assert!(session.tokens().is_none());
}

#[test]
fn persist_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    let session = SessionContext::load(&path).unwrap();
    session.set_tokens(tokens("tokA"));
    session.set_user(user());
    session.persist().unwrap();

    let reloaded = SessionContext::load(&path).unwrap();
    assert_eq!(reloaded.current_access_token().as_deref(), Some("tokA"));
    assert_eq!(reloaded.user().unwrap().username, "bea");
}

#[test]
fn clear_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let session = SessionContext::load(&path).unwrap();
    session.set_tokens(tokens("tokA"));
    session.persist().unwrap();
    assert!(path.exists());

    session.clear().unwrap();
    assert!(!path.exists());
    session.clear().unwrap();
}

#[test]
fn load_corrupt_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{not json").unwrap();
    let err = SessionContext::load(&path).unwrap_err();
    assert!(matches!(err, SessionError::Json(_)));
}

#[test]
fn persist_memory_only_is_noop() {
    let session = SessionContext::new();
    session.set_tokens(tokens("tokA"));
    session.persist().unwrap();
    assert!(session.path().is_none());
}
