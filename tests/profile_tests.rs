mod common;

use dashclient::error::{ClientError, ErrorCode};
use dashclient::profile::{OpenAiKeyInput, OpenAiMode, ProfileService};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::gateway;

#[tokio::test]
async fn settings_show_masked_key_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profile/openai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "mode": "byok",
            "key_masked": "sk-…wxyz",
            "model": "gpt-4o-mini",
            "history_limit": 20,
            "voice_enabled": true
        })))
        .mount(&server)
        .await;

    let settings = ProfileService::new(gateway(&server)).openai_settings().await.unwrap();
    assert_eq!(settings.mode, OpenAiMode::Byok);
    assert_eq!(settings.key_masked.as_deref(), Some("sk-…wxyz"));
    assert_eq!(settings.history_limit, Some(20));
    assert!(settings.voice_enabled);
}

#[tokio::test]
async fn malformed_key_is_reported_by_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/profile/openai/test"))
        .and(body_json(json!({"mode": "byok", "key": "not-a-key"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"ok": false, "error": "KEY_FORMAT"})))
        .expect(1)
        .mount(&server)
        .await;

    let input = OpenAiKeyInput::builder().key("not-a-key").build();
    let err = ProfileService::new(gateway(&server))
        .test_openai_key(input)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), Some(ErrorCode::KeyFormat));
}

#[tokio::test]
async fn accepted_key_returns_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/profile/openai/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "message": "Key checked"})))
        .mount(&server)
        .await;

    let input = OpenAiKeyInput::builder().key("sk-abcdefghijklmnopqrstuv").build();
    let message = ProfileService::new(gateway(&server))
        .test_openai_key(input)
        .await
        .unwrap();
    assert_eq!(message.as_deref(), Some("Key checked"));
}

#[tokio::test]
async fn save_sends_mode_key_and_voice_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/profile/openai/save"))
        .and(body_json(json!({"mode": "managed", "key": null, "voice_enabled": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "openai_mode=managed; HttpOnly; Path=/")
                .set_body_json(json!({"ok": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let input = OpenAiKeyInput::builder()
        .mode(OpenAiMode::Managed)
        .voice_enabled(true)
        .build();
    ProfileService::new(gateway(&server))
        .save_openai_settings(input)
        .await
        .unwrap();
}

#[tokio::test]
async fn masked_key_is_never_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/profile/openai/save"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(0)
        .mount(&server)
        .await;

    let input = OpenAiKeyInput::builder().key("sk-…wxyz").build();
    let err = ProfileService::new(gateway(&server))
        .save_openai_settings(input)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}
