//! Two-step Telegram activation: submit credentials, then the confirmation code.

use std::sync::Arc;

use serde::Serialize;
use strum::{Display, EnumString};

use crate::error::{ClientError, Result};
use crate::gateway::contract::ActivationResponse;
use crate::gateway::{call, ActivationCredentials, ApiRequest, Gateway};
use crate::resources::ResourceStore;

/// Where an activation handshake currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivationPhase {
    Idle,
    CodeRequested,
    Confirming,
    Done,
    Failed,
}

/// Transient state of one handshake. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationSession {
    pub resource_id: String,
    pub phase: ActivationPhase,
    /// Step-one credentials, resent with the code in step two.
    pub pending_payload: Option<ActivationCredentials>,
}

/// State machine driving the activation handshake for one page or prompt.
///
/// Steps take `&mut self`, so two steps of the same flow never overlap.
/// Each network step also claims the resource in the [`ResourceStore`], so
/// it cannot race a toggle or delete of the same resource.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use dashclient::activation::{ActivationFlow, ActivationPhase};
/// use dashclient::config::ClientConfig;
/// use dashclient::gateway::{ActivationCredentials, HttpGateway};
/// use dashclient::resources::ResourceStore;
///
/// # async fn example() -> dashclient::error::Result<()> {
/// let gateway = Arc::new(HttpGateway::new(&ClientConfig::new("http://127.0.0.1:8000"))?);
/// let mut flow = ActivationFlow::new(Arc::new(ResourceStore::new(gateway)));
/// let creds = ActivationCredentials::builder()
///     .phone("+15550001")
///     .app_id("12345")
///     .app_hash("abcdef")
///     .build();
/// if flow.begin("r1", creds).await? == ActivationPhase::CodeRequested {
///     flow.confirm("123456").await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct ActivationFlow<G: Gateway> {
    store: Arc<ResourceStore<G>>,
    session: Option<ActivationSession>,
    /// Resource activated by the last finished handshake.
    completed: Option<String>,
    last_error: Option<String>,
}

impl<G: Gateway> ActivationFlow<G> {
    pub fn new(store: Arc<ResourceStore<G>>) -> Self {
        Self {
            store,
            session: None,
            completed: None,
            last_error: None,
        }
    }

    /// `Done` persists after the session is destroyed, until the next
    /// `begin` or `cancel`.
    pub fn phase(&self) -> ActivationPhase {
        match (&self.session, &self.completed) {
            (Some(session), _) => session.phase,
            (None, Some(_)) => ActivationPhase::Done,
            (None, None) => ActivationPhase::Idle,
        }
    }

    pub fn session(&self) -> Option<&ActivationSession> {
        self.session.as_ref()
    }

    /// Id of the resource the last handshake activated.
    pub fn completed(&self) -> Option<&str> {
        self.completed.as_deref()
    }

    /// Text of the most recent failure, cleared by the next success or `cancel`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Submit step-one credentials.
    ///
    /// Any earlier pending code request is discarded: the backend issues a
    /// fresh single-use challenge for every submission.
    pub async fn begin(
        &mut self,
        resource_id: &str,
        credentials: ActivationCredentials,
    ) -> Result<ActivationPhase> {
        let resource_id = resource_id.trim();
        if resource_id.is_empty() {
            return Err(ClientError::Validation("Resource id is required".to_string()));
        }
        let credentials = credentials.trimmed();
        let missing = credentials.missing_fields();
        if !missing.is_empty() {
            return Err(ClientError::Validation(format!(
                "Fill in {}",
                missing.join(", ")
            )));
        }

        let claim = self.store.claim(resource_id)?;
        self.completed = None;
        if let Some(previous) = self.session.take() {
            if previous.phase == ActivationPhase::CodeRequested {
                tracing::info!(
                    resource_id = %previous.resource_id,
                    "Discarding pending code request for a new one"
                );
            }
        }
        self.session = Some(ActivationSession {
            resource_id: resource_id.to_string(),
            phase: ActivationPhase::Idle,
            pending_payload: None,
        });

        let request = ApiRequest::BeginActivation {
            resource_id: resource_id.to_string(),
            credentials: credentials.clone(),
        };
        let outcome: Result<ActivationResponse> = call(self.store.gateway().as_ref(), &request).await;
        drop(claim);

        match outcome {
            Ok(response) if response.activated => {
                tracing::info!(resource_id, "Activated without a confirmation code");
                self.finish().await;
                Ok(ActivationPhase::Done)
            }
            Ok(response) if response.need_code => {
                tracing::info!(resource_id, "Confirmation code requested");
                self.last_error = None;
                self.set(ActivationPhase::CodeRequested, Some(credentials));
                Ok(ActivationPhase::CodeRequested)
            }
            Ok(_) => {
                let err = ClientError::Protocol(
                    "begin_activation response has neither need_code nor activated".to_string(),
                );
                self.fail(&err);
                Err(err)
            }
            Err(err) => {
                tracing::warn!(resource_id, error = %err, "Activation request failed");
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Submit the confirmation code together with the retained credentials.
    ///
    /// A wrong code or a transport failure leaves the flow in
    /// `CodeRequested` so the user can retry. Only codes saying the
    /// challenge is gone move it to `Failed`.
    pub async fn confirm(&mut self, code: &str) -> Result<ActivationPhase> {
        let (resource_id, credentials) = match &self.session {
            Some(ActivationSession {
                resource_id,
                phase: ActivationPhase::CodeRequested | ActivationPhase::Confirming,
                pending_payload: Some(payload),
            }) => (resource_id.clone(), payload.clone()),
            _ => {
                return Err(ClientError::InvalidState(format!(
                    "No confirmation code was requested (phase: {})",
                    self.phase()
                )))
            }
        };
        let code = code.trim();
        if code.is_empty() {
            return Err(ClientError::Validation("Enter the confirmation code".to_string()));
        }

        let claim = self.store.claim(&resource_id)?;
        self.set(ActivationPhase::Confirming, Some(credentials.clone()));

        let request = ApiRequest::ConfirmActivation {
            resource_id: resource_id.clone(),
            credentials: credentials.clone(),
            code: code.to_string(),
        };
        let outcome: Result<ActivationResponse> = call(self.store.gateway().as_ref(), &request).await;
        drop(claim);

        let err = match outcome {
            Ok(response) if response.activated => {
                tracing::info!(resource_id = %resource_id, "Activation confirmed");
                self.finish().await;
                return Ok(ActivationPhase::Done);
            }
            Ok(_) => ClientError::Protocol("confirmation was not acknowledged".to_string()),
            Err(err) => err,
        };

        self.last_error = Some(err.to_string());
        if err.is_recoverable() {
            tracing::warn!(resource_id = %resource_id, error = %err, "Confirmation failed; retry allowed");
            self.set(ActivationPhase::CodeRequested, Some(credentials));
        } else {
            tracing::warn!(resource_id = %resource_id, error = %err, "Confirmation failed permanently");
            self.set(ActivationPhase::Failed, None);
        }
        Err(err)
    }

    /// Abandon the handshake and forget the retained credentials.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(resource_id = %session.resource_id, phase = %session.phase, "Activation cancelled");
        }
        self.completed = None;
        self.last_error = None;
    }

    fn set(&mut self, phase: ActivationPhase, payload: Option<ActivationCredentials>) {
        if let Some(session) = self.session.as_mut() {
            session.phase = phase;
            session.pending_payload = payload;
        }
    }

    fn fail(&mut self, err: &ClientError) {
        self.last_error = Some(err.to_string());
        self.set(ActivationPhase::Failed, None);
    }

    /// The session and its credentials are destroyed once activation succeeds.
    async fn finish(&mut self) {
        self.last_error = None;
        self.completed = self.session.take().map(|session| session.resource_id);
        if let Err(err) = self.store.list().await {
            tracing::warn!(error = %err, "Resource list refresh after activation failed");
        }
    }
}
