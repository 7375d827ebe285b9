//! Integration tests for the HTTP API.
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method
use wg_server::{api::AppState, config::SessionDefaultsConfig};
use wolfgame::session::SessionManager;

/// Helper to create a test server with an empty registry
fn create_test_server() -> (axum::Router, Arc<SessionManager>) {
    let session_manager = Arc::new(SessionManager::in_memory());
    let state = AppState {
        session_manager: session_manager.clone(),
        session_defaults: SessionDefaultsConfig {
            phase_timeout_secs: 0,
            ..SessionDefaultsConfig::default()
        },
    };
    (wg_server::api::create_router(state), session_manager)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_session(app: &axum::Router, body: Value) -> String {
    let (status, json) = send(app, "POST", "/api/v1/sessions", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    json["session_id"].as_str().unwrap().to_string()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, _) = create_test_server();

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["sessions"], 0);
}

// ============================================================================
// Session Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_list_sessions() {
    let (app, manager) = create_test_server();

    let id = create_session(&app, json!({"name": "Hamlet", "player_count": 8})).await;
    create_session(&app, json!({})).await;
    assert_eq!(manager.session_count().await, 2);

    let (status, json) = send(&app, "GET", "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    let sessions = json.as_array().unwrap();
    assert_eq!(sessions.len(), 2);

    let hamlet = sessions.iter().find(|s| s["session_id"] == id.as_str()).unwrap();
    assert_eq!(hamlet["name"], "Hamlet");
    assert_eq!(hamlet["player_count"], 8);
    assert_eq!(hamlet["phase"], "SETUP");
}

#[tokio::test]
async fn test_create_rejects_bad_player_count() {
    let (app, _) = create_test_server();

    let body = json!({"player_count": 1});
    let (status, json) = send(&app, "POST", "/api/v1/sessions", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_start_then_restart_conflicts() {
    let (app, _) = create_test_server();
    let id = create_session(&app, json!({})).await;

    let (status, json) = send(&app, "POST", &format!("/api/v1/sessions/{id}/start"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phase"], "NIGHT");
    assert_eq!(json["round"], 1);
    assert!(json["players"].as_array().unwrap().iter().all(|p| p["role"].is_string()));

    let (status, _) = send(&app, "POST", &format!("/api/v1/sessions/{id}/start"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let (app, _) = create_test_server();
    let missing = uuid::Uuid::new_v4();

    let (status, json) = send(&app, "GET", &format!("/api/v1/sessions/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Session not found");
}

// ============================================================================
// Action Tests
// ============================================================================

#[tokio::test]
async fn test_rejected_action_is_bad_request() {
    let (app, _) = create_test_server();
    let id = create_session(&app, json!({})).await;

    // Nothing is allowed before the game starts.
    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/v1/sessions/{id}/actions"),
        Some(json!({"player_id": "p0", "action": "sleep"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "can't sleep during setup");
}

#[tokio::test]
async fn test_night_closes_through_api() {
    let (app, _) = create_test_server();
    let id = create_session(&app, json!({"player_count": 6})).await;

    let (_, started) = send(&app, "POST", &format!("/api/v1/sessions/{id}/start"), None).await;
    let players = started["players"].as_array().unwrap();
    let with_role = |role: &str| -> Vec<String> {
        players
            .iter()
            .filter(|p| p["role"] == role)
            .map(|p| p["player_id"].as_str().unwrap().to_string())
            .collect()
    };
    let wolves = with_role("WEREWOLF");
    let seer = with_role("SEER").remove(0);
    let witch = with_role("WITCH").remove(0);
    let victim = with_role("VILLAGER").remove(0);

    let uri = format!("/api/v1/sessions/{id}/actions");
    for (player, action, target) in [
        (seer.as_str(), "check", wolves[0].as_str()),
        (witch.as_str(), "poison", wolves[1].as_str()),
        (wolves[0].as_str(), "kill", victim.as_str()),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            &uri,
            Some(json!({"player_id": player, "action": action, "target_id": target})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, snapshot) = send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["phase"], "POLICEMAN_SELECTION");
    let deaths = snapshot["last_night"]["deaths"].as_array().unwrap();
    assert_eq!(deaths.len(), 2);
}

#[tokio::test]
async fn test_transfer_requires_policeman() {
    let (app, _) = create_test_server();
    let id = create_session(&app, json!({})).await;
    send(&app, "POST", &format!("/api/v1/sessions/{id}/start"), None).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/v1/sessions/{id}/transfer"),
        Some(json!({"from": "p0", "to": "p1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "p0 isn't the policeman");
}

#[tokio::test]
async fn test_force_game_over_is_idempotent() {
    let (app, _) = create_test_server();
    let id = create_session(&app, json!({})).await;
    let uri = format!("/api/v1/sessions/{id}/game-over");

    let (status, json) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phase"], "GAME_OVER");
    assert_eq!(json["advanced"], true);

    let (status, json) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["advanced"], false);

    let (status, _) = send(&app, "POST", &format!("/api/v1/sessions/{id}/start"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
