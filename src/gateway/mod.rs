//! Request gateway: one uniform JSON envelope for every backend call.

pub mod contract;
pub mod http;

pub use contract::{
    ActivationCredentials, ApiRequest, ErrorBody, NewResource, ProviderInfo, ToggleAction,
    UserProfile,
};
pub use http::HttpGateway;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, Result};

/// Transport seam between the stores and the backend.
///
/// Implementations return the parsed success body, `{}` when the body is
/// empty or not JSON, and a normalized [`ClientError`] otherwise.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<Value>;

    /// Drop any locally held credentials. Transports without a session do nothing.
    fn forget_session(&self) -> Result<()> {
        Ok(())
    }
}

/// Send `request` and decode the success body into its response contract.
pub async fn call<G, T>(gateway: &G, request: &ApiRequest) -> Result<T>
where
    G: Gateway + ?Sized,
    T: DeserializeOwned,
{
    let body = gateway.send(request).await?;
    decode(request, body)
}

/// Validate a success body against the response contract.
pub fn decode<T: DeserializeOwned>(request: &ApiRequest, body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| {
        tracing::warn!(action = request.action(), error = %e, "Response does not match contract");
        ClientError::Protocol(format!("{} response: {e}", request.action()))
    })
}

/// Parse a success body; empty or non-JSON bodies become `{}`.
pub(crate) fn parse_lenient(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or_else(|_| Value::Object(Default::default()))
}

/// `{"ok": false, ...}` under a 2xx status is a failure like any non-2xx.
pub(crate) fn reject_not_ok(status: u16, body: Value) -> Result<Value> {
    if body.get("ok") == Some(&Value::Bool(false)) {
        return Err(ErrorBody::from_value(body).into_error(status));
    }
    Ok(body)
}
