//! Global assistant-bot switch.

use std::sync::Arc;

pub use crate::gateway::contract::{BotResource, BotRunOutcome};

use crate::error::Result;
use crate::gateway::contract::{BotRunResponse, BotStateResponse, BotStatusResponse, PreflightResponse};
use crate::gateway::{call, ApiRequest, Gateway};

/// Bot state as last reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotState {
    pub enabled: bool,
    /// Whether worker processes are actually running, when the backend says.
    pub running: Option<bool>,
}

impl BotState {
    pub fn label(&self) -> &'static str {
        if self.enabled {
            "enabled"
        } else {
            "disabled"
        }
    }
}

impl From<BotStatusResponse> for BotState {
    fn from(response: BotStatusResponse) -> Self {
        Self {
            enabled: response.bot_enabled,
            running: response.running,
        }
    }
}

/// Bot flag plus the per-resource view the worker manager keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotOverview {
    pub state: BotState,
    pub resources: Vec<BotResource>,
}

/// Reads and flips the bot flag and drives the workers. Never touches the resource list.
pub struct BotControl<G: Gateway> {
    gateway: Arc<G>,
}

impl<G: Gateway> BotControl<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn status(&self) -> Result<BotState> {
        let response: BotStatusResponse = call(self.gateway.as_ref(), &ApiRequest::BotStatus).await?;
        Ok(response.into())
    }

    pub async fn toggle(&self) -> Result<BotState> {
        let response: BotStatusResponse = call(self.gateway.as_ref(), &ApiRequest::BotToggle).await?;
        let state = BotState::from(response);
        tracing::info!(bot = state.label(), "Bot toggled");
        Ok(state)
    }

    /// Whether workers are currently running for this user.
    pub async fn preflight(&self) -> Result<bool> {
        let response: PreflightResponse =
            call(self.gateway.as_ref(), &ApiRequest::BotPreflight).await?;
        Ok(response.active)
    }

    /// Start workers for the active resources. A disabled bot is
    /// rejected by the backend with `BOT_DISABLED`.
    pub async fn start(&self) -> Result<Option<BotRunOutcome>> {
        let response: BotRunResponse = call(self.gateway.as_ref(), &ApiRequest::BotStart).await?;
        tracing::info!(outcome = ?response.message, "Bot start requested");
        Ok(response.message)
    }

    pub async fn stop(&self) -> Result<Option<BotRunOutcome>> {
        let response: BotRunResponse = call(self.gateway.as_ref(), &ApiRequest::BotStop).await?;
        tracing::info!(outcome = ?response.message, "Bot stop requested");
        Ok(response.message)
    }

    pub async fn overview(&self) -> Result<BotOverview> {
        let response: BotStateResponse = call(self.gateway.as_ref(), &ApiRequest::BotState).await?;
        Ok(BotOverview {
            state: BotState {
                enabled: response.bot_enabled,
                running: response.running,
            },
            resources: response.resources,
        })
    }
}
