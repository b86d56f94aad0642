use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use work_timer_bot::{
    api::create_router,
    services::RecordingPlatform,
    state::{AppState, ChannelId, UserId},
};

fn app() -> (Arc<RecordingPlatform>, Arc<AppState>, axum::Router) {
    let platform = Arc::new(RecordingPlatform::new());
    let state = Arc::new(AppState::new(
        platform.clone(),
        [UserId::new("admin")],
        "127.0.0.1".to_string(),
        20554,
    ));
    let router = create_router(Arc::clone(&state));
    (platform, state, router)
}

/// Send a request to the app and return (status, JSON body).
async fn send(router: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = router.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn assign(router: &axum::Router, hours: f64, minutes: f64) -> (StatusCode, Value) {
    send(
        router,
        "POST",
        "/commands",
        Some(json!({
            "command": "assign",
            "requester": "admin",
            "freelancer": "U",
            "hours": hours,
            "minutes": minutes,
            "private_channel": "C",
        })),
    )
    .await
}

#[tokio::test]
async fn health_returns_ok() {
    let (_, _, router) = app();
    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn assign_creates_one_timer() {
    let (_, _, router) = app();

    let (status, body) = assign(&router, 1.0, 30.0).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ephemeral"], true);
    assert_eq!(body["timer"]["total_duration_hours"], 1.5);
    assert!(body["follow_up"].as_str().unwrap().contains("/panel"));

    let (status, timers) = send(&router, "GET", "/timers", None).await;
    assert_eq!(status, StatusCode::OK);
    let timers = timers.as_array().unwrap();
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0]["owner_id"], "U");
    assert_eq!(timers[0]["reminder_count"], 0);
}

#[tokio::test]
async fn reassign_replaces_timer() {
    let (_, state, router) = app();
    assign(&router, 1.0, 0.0).await;
    assign(&router, 5.0, 0.0).await;

    let timers = state.store.all().unwrap();
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].total_duration_hours, 5.0);
}

#[tokio::test]
async fn non_admin_assign_is_forbidden() {
    let (_, state, router) = app();
    let (status, body) = send(
        &router,
        "POST",
        "/commands",
        Some(json!({
            "command": "assign",
            "requester": "U",
            "freelancer": "U",
            "hours": 2,
            "private_channel": "C",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], "error");
    assert_eq!(
        body["message"],
        "You need administrator permissions to use this command."
    );
    assert!(state.store.is_empty().unwrap());
}

#[tokio::test]
async fn invalid_duration_is_rejected() {
    let (_, state, router) = app();
    let (status, _) = assign(&router, 0.0, 0.0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(state.store.is_empty().unwrap());
}

#[tokio::test]
async fn overflowing_duration_is_rejected_and_store_stays_usable() {
    let (_, state, router) = app();
    let (status, _) = assign(&router, 1e10, 0.0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = assign(&router, 1.0, 0.0).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.store.len().unwrap(), 1);
}

#[tokio::test]
async fn panel_in_unreachable_channel_is_bad_gateway() {
    let (platform, state, router) = app();
    platform.make_unreachable(&ChannelId::new("P"));

    let (status, body) = send(
        &router,
        "POST",
        "/commands",
        Some(json!({ "command": "panel", "requester": "admin", "channel": "P" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], "error");
    assert!(state.panel_channel().is_none());
}

#[tokio::test]
async fn panel_command_renders_panel() {
    let (platform, _, router) = app();
    let (status, body) = send(
        &router,
        "POST",
        "/commands",
        Some(json!({ "command": "panel", "requester": "admin", "channel": "P" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("<#P>"));

    assign(&router, 2.0, 0.0).await;
    let panel = platform.last_panel().unwrap();
    assert!(panel.buttons_enabled);
    assert_eq!(panel.entries[0].total_duration, "2 hours");

    let (_, status_body) = send(&router, "GET", "/status", None).await;
    assert_eq!(status_body["panel_channel"], "P");
    assert_eq!(status_body["active_timers"], 1);
    assert_eq!(status_body["last_action"], "assign");
}

#[tokio::test]
async fn complete_button_removes_timer_and_notifies() {
    let (platform, state, router) = app();
    assign(&router, 2.0, 0.0).await;

    let (status, body) = send(
        &router,
        "POST",
        "/interactions/button",
        Some(json!({ "user_id": "U", "custom_id": "complete_any" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Work marked as complete!");
    assert!(state.store.is_empty().unwrap());
    let messages = platform.messages_to(&ChannelId::new("C"));
    assert!(messages.last().unwrap().contains("Work Completed"));
}

#[tokio::test]
async fn complete_without_timer_is_not_assigned() {
    let (_, _, router) = app();
    let (status, _) = send(
        &router,
        "POST",
        "/interactions/button",
        Some(json!({ "user_id": "U", "custom_id": "complete_any" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_button_is_bad_request() {
    let (_, _, router) = app();
    let (status, body) = send(
        &router,
        "POST",
        "/interactions/button",
        Some(json!({ "user_id": "U", "custom_id": "pause_any" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("pause_any"));
}

#[tokio::test]
async fn start_after_complete_restarts_from_settings() {
    let (_, state, router) = app();
    assign(&router, 2.0, 0.0).await;
    send(
        &router,
        "POST",
        "/timers/U/complete",
        Some(json!({ "requester": "U" })),
    )
    .await;

    let (status, body) = send(
        &router,
        "POST",
        "/timers/U/start",
        Some(json!({ "requester": "U" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("restarted"));
    let timer = state.store.get(&UserId::new("U")).unwrap().unwrap();
    assert_eq!(timer.reminder_count, 0);
    assert_eq!(timer.total_duration_hours, 2.0);
}

#[tokio::test]
async fn start_for_someone_else_is_forbidden() {
    let (_, _, router) = app();
    assign(&router, 2.0, 0.0).await;
    let (status, _) = send(
        &router,
        "POST",
        "/timers/U/start",
        Some(json!({ "requester": "V" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn panel_endpoint_formats_remaining_time() {
    let (_, _, router) = app();
    assign(&router, 25.0, 0.0).await;

    let (status, panel) = send(&router, "GET", "/panel", None).await;
    assert_eq!(status, StatusCode::OK);
    let remaining = panel["entries"][0]["time_remaining"].as_str().unwrap();
    assert!(remaining.starts_with("1d "), "remaining: {remaining}");
    assert_eq!(panel["entries"][0]["total_duration"], "25 hours");
}
