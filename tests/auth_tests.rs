mod common;

use std::sync::Arc;

use dashclient::error::ClientError;
use dashclient::session::{AuthService, MemorySessionStore, SessionStore};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{gateway, gateway_with_store};

#[tokio::test]
async fn login_trims_username_and_returns_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "ann", "password": "pw"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "session=s1; Path=/")
                .set_body_json(json!({"ok": true, "redirect": "/dashboard"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    let outcome = AuthService::new(gateway.clone())
        .login("  ann ", "pw")
        .await
        .unwrap();
    assert_eq!(outcome.redirect.as_deref(), Some("/dashboard"));
    assert_eq!(gateway.session().as_deref(), Some("s1"));
}

#[tokio::test]
async fn login_with_empty_fields_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let auth = AuthService::new(gateway(&server));
    assert!(matches!(auth.login(" ", "pw").await, Err(ClientError::Validation(_))));
    assert!(matches!(auth.login("ann", "").await, Err(ClientError::Validation(_))));
}

#[tokio::test]
async fn wrong_password_maps_to_guidance() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "INVALID_CREDENTIALS"})))
        .mount(&server)
        .await;

    let err = AuthService::new(gateway(&server))
        .login("ann", "nope")
        .await
        .unwrap_err();
    assert_eq!(err.user_message("Login failed"), "Wrong username or password.");
}

#[tokio::test]
async fn register_omits_blank_email() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({"username": "bob", "email": null, "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    AuthService::new(gateway(&server))
        .register("bob", Some("  "), "pw")
        .await
        .unwrap();
}

#[tokio::test]
async fn logout_clears_session_even_when_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_value("s1"));
    let gateway = gateway_with_store(&server, store.clone());
    AuthService::new(gateway.clone()).logout().await.unwrap();

    assert_eq!(gateway.session(), None);
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn me_and_providers_decode_contracts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": 7, "username": "ann", "email": "ann@example.com", "role": "admin"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/providers/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "providers": [{"key": "telegram", "name": "Telegram"}, {"key": "avito"}]
        })))
        .mount(&server)
        .await;

    let auth = AuthService::new(gateway(&server));
    let user = auth.me().await.unwrap();
    assert_eq!(user.id, 7);
    assert_eq!(user.role.as_deref(), Some("admin"));

    let keys: Vec<_> = auth.providers().await.unwrap().into_iter().map(|p| p.key).collect();
    assert_eq!(keys, vec!["telegram", "avito"]);
}

#[tokio::test]
async fn me_without_session_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Unauthorized"})))
        .mount(&server)
        .await;

    let err = AuthService::new(gateway(&server)).me().await.unwrap_err();
    assert_eq!(
        err.category(),
        dashclient::error::ErrorCategory::Authentication
    );
}
