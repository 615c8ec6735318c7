//! Exercises `AojAuthGateway` against an in-process mock of the judge API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aoj_auth::{AojAuthGateway, AuthGateway, GatewayConfig};
use aoj_core::{ErrorKind, Session, SessionId};
use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

const TOKEN: &str = "tok-alice";

#[derive(Clone, Default)]
struct Judge {
    logins: Arc<AtomicUsize>,
    logouts: Arc<AtomicUsize>,
    lookups: Arc<AtomicUsize>,
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn login(State(judge): State<Judge>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    judge.logins.fetch_add(1, Ordering::SeqCst);

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if content_type != "application/json;charset=UTF-8" {
        return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
    }

    let id = body["id"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (id, password) {
        ("alice", "secret") => (
            StatusCode::OK,
            Json(json!({
                "id": "alice",
                "name": "Alice",
                "sessionId": "remote-handle",
                "token": TOKEN,
            })),
        )
            .into_response(),
        ("garbled", _) => (StatusCode::OK, "not json").into_response(),
        ("tokenless", _) => (StatusCode::OK, Json(json!({"id": "tokenless"}))).into_response(),
        ("anonymous", _) => (StatusCode::OK, Json(json!({"id": "", "token": TOKEN}))).into_response(),
        ("malformed", _) => StatusCode::BAD_REQUEST.into_response(),
        ("crash", _) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        ("teapot", _) => StatusCode::IM_A_TEAPOT.into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn logout(State(judge): State<Judge>, headers: HeaderMap) -> StatusCode {
    judge.logouts.fetch_add(1, Ordering::SeqCst);
    match bearer(&headers) {
        Some(TOKEN) => StatusCode::NO_CONTENT,
        _ => StatusCode::UNAUTHORIZED,
    }
}

async fn user(State(judge): State<Judge>, Path(id): Path<String>, headers: HeaderMap) -> StatusCode {
    judge.lookups.fetch_add(1, Ordering::SeqCst);
    match (id.as_str(), bearer(&headers)) {
        ("alice", Some(TOKEN)) => StatusCode::OK,
        ("a b", Some(TOKEN)) => StatusCode::OK,
        _ => StatusCode::UNAUTHORIZED,
    }
}

async fn spawn_judge() -> (AojAuthGateway, Judge) {
    let judge = Judge::default();
    let app = Router::new()
        .route("/session", post(login).delete(logout))
        .route("/user/{id}", get(user))
        .with_state(judge.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let gateway = AojAuthGateway::new(GatewayConfig {
        base_url: format!("http://{addr}"),
        request_timeout: Duration::from_secs(5),
    })
    .unwrap();
    (gateway, judge)
}

/// A base URL on which nothing is listening.
async fn dead_gateway() -> AojAuthGateway {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    AojAuthGateway::new(GatewayConfig {
        base_url: format!("http://{addr}"),
        request_timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn session_for(username: &str, token: &str, ttl: chrono::Duration) -> Session {
    Session::with_duration(SessionId::generate().unwrap(), username, token, ttl)
}

// =========================================================================
// Login
// =========================================================================

#[tokio::test]
async fn test_login_success_builds_fresh_session() {
    let (gateway, _) = spawn_judge().await;

    let session = gateway.login("alice", "secret").await.unwrap();

    assert_eq!(session.username(), "alice");
    assert_eq!(session.token(), TOKEN);
    assert!(session.is_valid());
    assert!(session.id().is_secure());
    let ttl = session.time_until_expiry();
    assert!(ttl > chrono::Duration::hours(23) && ttl <= chrono::Duration::hours(24));
}

#[tokio::test]
async fn test_login_generates_distinct_ids() {
    let (gateway, _) = spawn_judge().await;
    let first = gateway.login("alice", "secret").await.unwrap();
    let second = gateway.login("alice", "secret").await.unwrap();
    assert_ne!(first.id(), second.id());
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let (gateway, judge) = spawn_judge().await;
    let err = gateway.login("alice", "wrong").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(judge.logins.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_login_status_mapping() {
    let (gateway, _) = spawn_judge().await;

    let cases = [
        ("malformed", ErrorKind::InvalidInput),
        ("crash", ErrorKind::ServiceUnavailable),
        ("teapot", ErrorKind::InternalServer),
    ];
    for (username, expected) in cases {
        let err = gateway.login(username, "pw").await.unwrap_err();
        assert_eq!(err.kind(), expected, "username {username}");
    }
}

#[tokio::test]
async fn test_login_undecodable_body_is_internal() {
    let (gateway, _) = spawn_judge().await;
    let err = gateway.login("garbled", "pw").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InternalServer);
}

#[tokio::test]
async fn test_login_response_without_credentials_is_internal() {
    let (gateway, _) = spawn_judge().await;

    for username in ["tokenless", "anonymous"] {
        let err = gateway.login(username, "pw").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalServer, "username {username}");
        assert_eq!(err.message(), "failed to decode login response");
    }
}

#[tokio::test]
async fn test_login_transport_failure_is_network_error() {
    let gateway = dead_gateway().await;
    let err = gateway.login("alice", "secret").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkError);
}

// =========================================================================
// Logout
// =========================================================================

#[tokio::test]
async fn test_logout_sends_bearer_token() {
    let (gateway, judge) = spawn_judge().await;
    let session = session_for("alice", TOKEN, chrono::Duration::hours(1));

    gateway.logout(&session).await.unwrap();
    assert_eq!(judge.logouts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_logout_non_success_status_is_not_an_error() {
    let (gateway, judge) = spawn_judge().await;
    let session = session_for("alice", "stale-token", chrono::Duration::hours(1));

    gateway.logout(&session).await.unwrap();
    assert_eq!(judge.logouts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_logout_transport_failure_is_network_error() {
    let gateway = dead_gateway().await;
    let session = session_for("alice", TOKEN, chrono::Duration::hours(1));
    let err = gateway.logout(&session).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkError);
}

// =========================================================================
// Validation
// =========================================================================

#[tokio::test]
async fn test_validate_accepted_token() {
    let (gateway, judge) = spawn_judge().await;
    let session = session_for("alice", TOKEN, chrono::Duration::hours(1));

    assert!(gateway.validate_session(&session).await.unwrap());
    assert_eq!(judge.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_validate_rejected_token() {
    let (gateway, _) = spawn_judge().await;
    let session = session_for("alice", "revoked", chrono::Duration::hours(1));
    assert!(!gateway.validate_session(&session).await.unwrap());
}

#[tokio::test]
async fn test_validate_percent_encodes_username() {
    let (gateway, _) = spawn_judge().await;
    let session = session_for("a b", TOKEN, chrono::Duration::hours(1));
    assert!(gateway.validate_session(&session).await.unwrap());
}

#[tokio::test]
async fn test_validate_expired_session_skips_remote_call() {
    let (gateway, judge) = spawn_judge().await;
    let session = session_for("alice", TOKEN, chrono::Duration::hours(-1));

    assert!(!gateway.validate_session(&session).await.unwrap());
    assert_eq!(judge.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_validate_transport_failure_is_network_error() {
    let gateway = dead_gateway().await;
    let session = session_for("alice", TOKEN, chrono::Duration::hours(1));
    let err = gateway.validate_session(&session).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkError);
}

// =========================================================================
// Refresh
// =========================================================================

#[tokio::test]
async fn test_refresh_mints_new_session() {
    let (gateway, _) = spawn_judge().await;
    let original = session_for("alice", TOKEN, chrono::Duration::minutes(5));

    let refreshed = gateway.refresh_session(&original).await.unwrap();

    assert_ne!(refreshed.id(), original.id());
    assert_eq!(refreshed.username(), "alice");
    assert_eq!(refreshed.token(), TOKEN);
    assert!(refreshed.time_until_expiry() > chrono::Duration::hours(23));
    // The original is not extended.
    assert!(original.time_until_expiry() <= chrono::Duration::minutes(5));
}

#[tokio::test]
async fn test_refresh_invalid_session_is_unauthorized() {
    let (gateway, _) = spawn_judge().await;
    let session = session_for("alice", "revoked", chrono::Duration::hours(1));
    let err = gateway.refresh_session(&session).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[tokio::test]
async fn test_refresh_expired_session_is_unauthorized() {
    let (gateway, judge) = spawn_judge().await;
    let session = session_for("alice", TOKEN, chrono::Duration::hours(-1));
    let err = gateway.refresh_session(&session).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(judge.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_refresh_transport_failure_keeps_kind_and_adds_context() {
    let gateway = dead_gateway().await;
    let session = session_for("alice", TOKEN, chrono::Duration::hours(1));

    let err = gateway.refresh_session(&session).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NetworkError);
    assert_eq!(err.message(), "failed to validate session for refresh");
}
