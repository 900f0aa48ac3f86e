//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use dashclient::config::ClientConfig;
use dashclient::gateway::HttpGateway;
use dashclient::resources::ResourceStore;
use dashclient::session::MemorySessionStore;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn gateway(server: &MockServer) -> Arc<HttpGateway> {
    Arc::new(HttpGateway::new(&ClientConfig::new(server.uri())).expect("gateway"))
}

pub fn gateway_with_store(server: &MockServer, store: Arc<MemorySessionStore>) -> Arc<HttpGateway> {
    let gateway = HttpGateway::new(&ClientConfig::new(server.uri()))
        .expect("gateway")
        .with_session_store(store)
        .expect("restore session");
    Arc::new(gateway)
}

pub fn store(server: &MockServer) -> Arc<ResourceStore<HttpGateway>> {
    Arc::new(ResourceStore::new(gateway(server)))
}

pub fn resource(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "provider": "telegram",
        "label": format!("Resource {id}"),
        "status": status,
        "phase": null,
        "last_error_code": null,
        "meta": {"creds": {"phone": "+15550001", "app_id": "1", "app_hash": "secret"}}
    })
}

/// Mount the list endpoint returning `items`.
pub async fn mount_list(server: &MockServer, items: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/api/resources/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
        .mount(server)
        .await;
}

/// A JSON response held back for `millis`, to keep a request in flight.
pub fn delayed_json(body: Value, millis: u64) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(body)
        .set_delay(Duration::from_millis(millis))
}
