//! Login, registration, logout and profile lookups.

pub mod store;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

use std::sync::Arc;

use crate::error::{ClientError, Result};
use crate::gateway::contract::{LoginResponse, MeResponse, ProvidersResponse};
use crate::gateway::{call, ApiRequest, Gateway, ProviderInfo, UserProfile};

/// Where the backend suggests going after a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub redirect: Option<String>,
}

/// Account-level calls that are not tied to a single resource.
///
/// The session cookie itself is managed by the gateway; this service only
/// validates input and interprets the responses.
pub struct AuthService<G: Gateway> {
    gateway: Arc<G>,
}

impl<G: Gateway> AuthService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        let request = ApiRequest::Login {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = call(self.gateway.as_ref(), &request).await?;
        tracing::info!(username, "Logged in");
        Ok(LoginOutcome {
            redirect: response.redirect,
        })
    }

    pub async fn register(
        &self,
        username: &str,
        email: Option<&str>,
        password: &str,
    ) -> Result<LoginOutcome> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        let request = ApiRequest::Register {
            username: username.to_string(),
            email: email.map(str::to_string),
            password: password.to_string(),
        };
        let response: LoginResponse = call(self.gateway.as_ref(), &request).await?;
        tracing::info!(username, "Registered");
        Ok(LoginOutcome {
            redirect: response.redirect,
        })
    }

    /// Fire-and-forget logout; the local session is cleared even if the call fails.
    pub async fn logout(&self) -> Result<()> {
        let sent = self.gateway.send(&ApiRequest::Logout).await;
        self.gateway.forget_session()?;
        match sent {
            Ok(_) => Ok(()),
            Err(err @ ClientError::Network(_)) => Err(err),
            Err(err) => {
                tracing::warn!(error = %err, "Logout rejected by backend; local session dropped");
                Ok(())
            }
        }
    }

    pub async fn me(&self) -> Result<UserProfile> {
        let response: MeResponse = call(self.gateway.as_ref(), &ApiRequest::Me).await?;
        Ok(response.user)
    }

    /// Catalogue of resource types that can be added.
    pub async fn providers(&self) -> Result<Vec<ProviderInfo>> {
        let response: ProvidersResponse =
            call(self.gateway.as_ref(), &ApiRequest::Providers).await?;
        Ok(response.providers)
    }
}
