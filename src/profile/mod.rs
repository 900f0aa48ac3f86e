//! Per-user OpenAI access settings from the profile page.

use std::sync::Arc;

use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strum::{Display, EnumString};

use crate::error::{ClientError, Result};
use crate::gateway::{call, ApiRequest, Gateway};

/// Who pays for model calls: the user's own key, or the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OpenAiMode {
    #[default]
    Byok,
    Managed,
}

/// OpenAI settings as the backend reports them. The key is only ever masked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default)]
    pub mode: OpenAiMode,
    #[serde(default)]
    pub key_masked: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub history_limit: Option<u32>,
    #[serde(default)]
    pub voice_enabled: bool,
}

/// Key and mode submitted for a check or a save.
#[derive(Clone, PartialEq, Eq, Builder)]
pub struct OpenAiKeyInput {
    #[builder(default)]
    pub mode: OpenAiMode,
    #[builder(into)]
    pub key: Option<String>,
    #[builder(default)]
    pub voice_enabled: bool,
}

impl std::fmt::Debug for OpenAiKeyInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiKeyInput")
            .field("mode", &self.mode)
            .field("key", &self.key.as_ref().map(|_| "••••••"))
            .field("voice_enabled", &self.voice_enabled)
            .finish()
    }
}

impl OpenAiKeyInput {
    /// The trimmed key to send; managed mode never sends one.
    pub fn key_to_send(&self) -> Option<&str> {
        match self.mode {
            OpenAiMode::Managed => None,
            OpenAiMode::Byok => self.key.as_deref().map(str::trim).filter(|k| !k.is_empty()),
        }
    }

    /// Own-key mode needs a full key. The masked value shown by the
    /// settings page is not one.
    pub fn validate(&self) -> Result<()> {
        if self.mode == OpenAiMode::Managed {
            return Ok(());
        }
        match self.key_to_send() {
            None => Err(ClientError::Validation("Enter an OpenAI API key".to_string())),
            Some(key) if key.contains('…') || key.contains('*') => Err(ClientError::Validation(
                "Enter the full key; the masked value cannot be reused".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }

    pub(crate) fn test_body(&self) -> Value {
        json!({ "mode": self.mode, "key": self.key_to_send() })
    }

    pub(crate) fn save_body(&self) -> Value {
        json!({
            "mode": self.mode,
            "key": self.key_to_send(),
            "voice_enabled": self.voice_enabled,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeyCheckResponse {
    pub message: Option<String>,
}

/// Reads, checks and saves the OpenAI settings of the signed-in user.
pub struct ProfileService<G: Gateway> {
    gateway: Arc<G>,
}

impl<G: Gateway> ProfileService<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    pub async fn openai_settings(&self) -> Result<OpenAiSettings> {
        call(self.gateway.as_ref(), &ApiRequest::OpenAiSettings).await
    }

    /// Ask the backend whether the key is usable; returns its message.
    ///
    /// A malformed key comes back as `KEY_FORMAT`.
    pub async fn test_openai_key(&self, input: OpenAiKeyInput) -> Result<Option<String>> {
        input.validate()?;
        let response: KeyCheckResponse =
            call(self.gateway.as_ref(), &ApiRequest::TestOpenAiKey(input)).await?;
        Ok(response.message)
    }

    pub async fn save_openai_settings(&self, input: OpenAiKeyInput) -> Result<()> {
        input.validate()?;
        let mode = input.mode;
        self.gateway
            .send(&ApiRequest::SaveOpenAiSettings(input))
            .await?;
        tracing::info!(%mode, "OpenAI settings saved");
        Ok(())
    }
}
