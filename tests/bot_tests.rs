mod common;

use dashclient::bot::{BotControl, BotRunOutcome};
use dashclient::error::ErrorCode;
use dashclient::resources::ResourceStatus;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::gateway;

#[tokio::test]
async fn status_reports_flag_and_workers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bot/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bot_enabled": false, "running": false})))
        .mount(&server)
        .await;

    let state = BotControl::new(gateway(&server)).status().await.unwrap();
    assert!(!state.enabled);
    assert_eq!(state.running, Some(false));
    assert_eq!(state.label(), "disabled");
}

#[tokio::test]
async fn toggle_uses_returned_state_and_never_touches_resources() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/bot/toggle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "bot_enabled": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/resources/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(0)
        .mount(&server)
        .await;

    let state = BotControl::new(gateway(&server)).toggle().await.unwrap();
    assert!(state.enabled);
    assert_eq!(state.running, None);
}

#[tokio::test]
async fn toggle_without_flag_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/bot/toggle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let err = BotControl::new(gateway(&server)).toggle().await.unwrap_err();
    assert!(matches!(err, dashclient::error::ClientError::Protocol(_)));
}

#[tokio::test]
async fn preflight_reports_running_workers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/preflight"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "active": true})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(BotControl::new(gateway(&server)).preflight().await.unwrap());
}

#[tokio::test]
async fn start_and_stop_report_outcome() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/bot/start"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ok": true, "message": "no_active_resources"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/bot/stop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "message": "not_running"})))
        .expect(1)
        .mount(&server)
        .await;

    let bot = BotControl::new(gateway(&server));
    assert_eq!(bot.start().await.unwrap(), Some(BotRunOutcome::NoActiveResources));
    assert_eq!(bot.stop().await.unwrap(), Some(BotRunOutcome::NotRunning));
}

#[tokio::test]
async fn start_of_disabled_bot_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/bot/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": false, "error": "BOT_DISABLED"})))
        .mount(&server)
        .await;

    let err = BotControl::new(gateway(&server)).start().await.unwrap_err();
    assert_eq!(err.error_code(), Some(ErrorCode::BotDisabled));
    assert_eq!(err.user_message("Bot request failed"), "The bot is switched off. Enable it first.");
}

#[tokio::test]
async fn overview_lists_worker_view_of_resources() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/bot/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "bot_enabled": true,
            "running": true,
            "resources": [
                {"id": "r1", "provider": "telegram", "status": "active", "phase": "ready",
                 "has_session": true, "error": null},
                {"id": "r2", "provider": "telegram", "status": "invalid", "phase": null,
                 "has_session": false, "error": "MISSING_SESSION"}
            ]
        })))
        .mount(&server)
        .await;

    let overview = BotControl::new(gateway(&server)).overview().await.unwrap();
    assert_eq!(overview.state.running, Some(true));
    assert_eq!(overview.resources.len(), 2);
    assert!(overview.resources[0].has_session);
    assert_eq!(overview.resources[1].status, ResourceStatus::Invalid);
    assert_eq!(overview.resources[1].error.as_deref(), Some("MISSING_SESSION"));
}
