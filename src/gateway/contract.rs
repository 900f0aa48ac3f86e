//! Typed request and response contracts, one request variant per backend action.

use bon::Builder;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use strum::{Display, EnumString};

use crate::config::EndpointPaths;
use crate::error::ClientError;
use crate::profile::OpenAiKeyInput;
use crate::resources::{Resource, ResourceStatus};

/// Requested transition for a resource toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToggleAction {
    Activate,
    Pause,
}

impl ToggleAction {
    /// `active` pauses; every other status activates.
    pub fn inverse_of(status: ResourceStatus) -> Self {
        if status == ResourceStatus::Active {
            Self::Pause
        } else {
            Self::Activate
        }
    }
}

/// Input for creating a resource.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct NewResource {
    #[builder(into)]
    pub provider: String,
    #[builder(into)]
    pub label: Option<String>,
    pub metadata: Option<Map<String, Value>>,
}

/// Step-one credentials of the Telegram activation handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct ActivationCredentials {
    #[builder(into)]
    pub phone: String,
    #[builder(into)]
    pub app_id: String,
    #[builder(into)]
    pub app_hash: String,
}

impl ActivationCredentials {
    /// Names of the fields that are blank after trimming.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("phone", &self.phone),
            ("app_id", &self.app_id),
            ("app_hash", &self.app_hash),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn trimmed(&self) -> Self {
        Self {
            phone: self.phone.trim().to_string(),
            app_id: self.app_id.trim().to_string(),
            app_hash: self.app_hash.trim().to_string(),
        }
    }
}

/// Every call the client can make.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    ListResources,
    GetResource {
        id: String,
    },
    UpdateResource {
        id: String,
        label: String,
        metadata: Map<String, Value>,
    },
    ToggleResource {
        id: String,
        action: ToggleAction,
    },
    AddResource(NewResource),
    DeleteResource {
        id: String,
    },
    BeginActivation {
        resource_id: String,
        credentials: ActivationCredentials,
    },
    ConfirmActivation {
        resource_id: String,
        credentials: ActivationCredentials,
        code: String,
    },
    BotStatus,
    BotToggle,
    BotPreflight,
    BotStart,
    BotStop,
    BotState,
    OpenAiSettings,
    TestOpenAiKey(OpenAiKeyInput),
    SaveOpenAiSettings(OpenAiKeyInput),
    ZoomItems {
        id: String,
    },
    ZoomReports {
        id: String,
    },
    /// Multipart upload of one recording.
    ZoomUpload {
        id: String,
        filename: String,
        data: Vec<u8>,
    },
    ZoomProcess {
        id: String,
        filename: String,
    },
    ZoomReport {
        id: String,
        filename: String,
        prompt: String,
    },
    /// Plain-text body, returned as a JSON string.
    ZoomOpenReport {
        id: String,
        filename: String,
    },
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        email: Option<String>,
        password: String,
    },
    Logout,
    Me,
    Providers,
}

impl ApiRequest {
    /// Short action name used in logs and protocol errors.
    pub fn action(&self) -> &'static str {
        match self {
            Self::ListResources => "list_resources",
            Self::GetResource { .. } => "get_resource",
            Self::UpdateResource { .. } => "update_resource",
            Self::ToggleResource { .. } => "toggle_resource",
            Self::AddResource(_) => "add_resource",
            Self::DeleteResource { .. } => "delete_resource",
            Self::BeginActivation { .. } => "begin_activation",
            Self::ConfirmActivation { .. } => "confirm_activation",
            Self::BotStatus => "bot_status",
            Self::BotToggle => "bot_toggle",
            Self::BotPreflight => "bot_preflight",
            Self::BotStart => "bot_start",
            Self::BotStop => "bot_stop",
            Self::BotState => "bot_state",
            Self::OpenAiSettings => "openai_settings",
            Self::TestOpenAiKey(_) => "openai_test",
            Self::SaveOpenAiSettings(_) => "openai_save",
            Self::ZoomItems { .. } => "zoom_items",
            Self::ZoomReports { .. } => "zoom_reports",
            Self::ZoomUpload { .. } => "zoom_upload",
            Self::ZoomProcess { .. } => "zoom_process",
            Self::ZoomReport { .. } => "zoom_report",
            Self::ZoomOpenReport { .. } => "zoom_open_report",
            Self::Login { .. } => "login",
            Self::Register { .. } => "register",
            Self::Logout => "logout",
            Self::Me => "me",
            Self::Providers => "providers",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Self::ListResources
            | Self::GetResource { .. }
            | Self::BotStatus
            | Self::BotPreflight
            | Self::BotState
            | Self::OpenAiSettings
            | Self::ZoomItems { .. }
            | Self::ZoomReports { .. }
            | Self::ZoomOpenReport { .. }
            | Self::Me
            | Self::Providers => Method::GET,
            Self::UpdateResource { .. } => Method::PUT,
            Self::DeleteResource { .. } => Method::DELETE,
            _ => Method::POST,
        }
    }

    /// The resource this request targets, if any.
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            Self::GetResource { id }
            | Self::UpdateResource { id, .. }
            | Self::ToggleResource { id, .. }
            | Self::DeleteResource { id }
            | Self::ZoomItems { id }
            | Self::ZoomReports { id }
            | Self::ZoomUpload { id, .. }
            | Self::ZoomProcess { id, .. }
            | Self::ZoomReport { id, .. }
            | Self::ZoomOpenReport { id, .. } => Some(id),
            Self::BeginActivation { resource_id, .. }
            | Self::ConfirmActivation { resource_id, .. } => Some(resource_id),
            _ => None,
        }
    }

    pub fn path_template<'a>(&self, paths: &'a EndpointPaths) -> &'a str {
        match self {
            Self::ListResources => &paths.resources_list,
            Self::GetResource { .. } | Self::UpdateResource { .. } => &paths.resource_detail,
            Self::ToggleResource { .. } => &paths.resource_toggle,
            Self::AddResource(_) => &paths.resource_add,
            Self::DeleteResource { .. } => &paths.resource_delete,
            Self::BeginActivation { .. } | Self::ConfirmActivation { .. } => &paths.activate,
            Self::BotStatus => &paths.bot_status,
            Self::BotToggle => &paths.bot_toggle,
            Self::BotPreflight => &paths.bot_preflight,
            Self::BotStart => &paths.bot_start,
            Self::BotStop => &paths.bot_stop,
            Self::BotState => &paths.bot_state,
            Self::OpenAiSettings => &paths.openai_settings,
            Self::TestOpenAiKey(_) => &paths.openai_test,
            Self::SaveOpenAiSettings(_) => &paths.openai_save,
            Self::ZoomItems { .. } => &paths.zoom_items,
            Self::ZoomReports { .. } => &paths.zoom_reports,
            Self::ZoomUpload { .. } => &paths.zoom_upload,
            Self::ZoomProcess { .. } => &paths.zoom_process,
            Self::ZoomReport { .. } => &paths.zoom_report,
            Self::ZoomOpenReport { .. } => &paths.zoom_report_open,
            Self::Login { .. } => &paths.login,
            Self::Register { .. } => &paths.register,
            Self::Logout => &paths.logout,
            Self::Me => &paths.me,
            Self::Providers => &paths.providers,
        }
    }

    /// Query string pairs appended to the path.
    pub fn query(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::ZoomOpenReport { filename, .. } => vec![("filename", filename.as_str())],
            _ => Vec::new(),
        }
    }

    /// File sent as `multipart/form-data` instead of a JSON body: field
    /// name, file name, content type and bytes.
    pub fn upload(&self) -> Option<(&'static str, &str, &'static str, &[u8])> {
        match self {
            Self::ZoomUpload { filename, data, .. } => {
                Some(("file", filename.as_str(), "audio/mpeg", data.as_slice()))
            }
            _ => None,
        }
    }

    /// Whether the success body is plain text rather than JSON.
    pub fn expects_text(&self) -> bool {
        matches!(self, Self::ZoomOpenReport { .. })
    }

    /// JSON body; `None` for GET, DELETE and uploads. Bodyless POSTs send `{}`.
    pub fn body(&self) -> Option<Value> {
        match self {
            Self::ListResources
            | Self::GetResource { .. }
            | Self::DeleteResource { .. }
            | Self::BotStatus
            | Self::BotPreflight
            | Self::BotState
            | Self::OpenAiSettings
            | Self::ZoomItems { .. }
            | Self::ZoomReports { .. }
            | Self::ZoomUpload { .. }
            | Self::ZoomOpenReport { .. }
            | Self::Me
            | Self::Providers => None,
            Self::UpdateResource {
                label, metadata, ..
            } => Some(json!({ "label": label, "meta_json": metadata })),
            Self::ToggleResource { id, action } => Some(json!({ "id": id, "action": action })),
            Self::AddResource(new) => Some(json!({
                "provider": new.provider,
                "label": new.label.clone().unwrap_or_else(|| new.provider.clone()),
                "meta_json": new.metadata,
            })),
            Self::BeginActivation { credentials, .. } => Some(json!({
                "phone": credentials.phone,
                "app_id": credentials.app_id,
                "app_hash": credentials.app_hash,
                "code": Value::Null,
            })),
            Self::ConfirmActivation {
                credentials, code, ..
            } => Some(json!({
                "phone": credentials.phone,
                "app_id": credentials.app_id,
                "app_hash": credentials.app_hash,
                "code": code,
            })),
            Self::BotToggle | Self::BotStart | Self::BotStop | Self::Logout => Some(json!({})),
            Self::TestOpenAiKey(input) => Some(input.test_body()),
            Self::SaveOpenAiSettings(input) => Some(input.save_body()),
            Self::ZoomProcess { filename, .. } => Some(json!({ "filename": filename })),
            Self::ZoomReport {
                filename, prompt, ..
            } => Some(json!({ "filename": filename, "prompt": prompt })),
            Self::Login { username, password } => {
                Some(json!({ "username": username, "password": password }))
            }
            Self::Register {
                username,
                email,
                password,
            } => Some(json!({ "username": username, "email": email, "password": password })),
        }
    }
}

/// Structured failure body. Every field is optional; unparsable bodies become the default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub error: Option<Value>,
    pub detail: Option<Value>,
    pub message: Option<String>,
    pub issues: Vec<String>,
    pub wait_seconds: Option<u64>,
}

impl ErrorBody {
    pub fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// `error` wins over `detail`; non-string values are ignored.
    pub fn code(&self) -> Option<String> {
        [&self.error, &self.detail]
            .into_iter()
            .flatten()
            .find_map(|value| value.as_str())
            .map(str::to_string)
    }

    pub fn into_error(self, status: u16) -> ClientError {
        ClientError::Server {
            status,
            code: self.code(),
            message: self.message,
            issues: self.issues,
            retry_after_secs: self.wait_seconds,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceList {
    pub items: Vec<Resource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToggleResponse {
    pub status: ResourceStatus,
    #[serde(default)]
    pub phase: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddResponse {
    pub id: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub status: Option<ResourceStatus>,
    #[serde(default)]
    pub phase: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActivationResponse {
    pub need_code: bool,
    pub activated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotStatusResponse {
    pub bot_enabled: bool,
    #[serde(default)]
    pub running: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreflightResponse {
    pub active: bool,
}

/// What a bot start or stop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BotRunOutcome {
    BotStarted,
    NoActiveResources,
    BotStopped,
    NotRunning,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BotRunResponse {
    pub message: Option<BotRunOutcome>,
}

/// Per-resource line of the bot state report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BotResource {
    pub id: String,
    pub provider: String,
    pub status: ResourceStatus,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub has_session: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotStateResponse {
    pub bot_enabled: bool,
    #[serde(default)]
    pub running: Option<bool>,
    #[serde(default)]
    pub resources: Vec<BotResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub redirect: Option<String>,
}

/// The signed-in user as reported by `/api/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

/// Catalogue entry describing a resource type that can be added.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderInfo {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub template: Option<Map<String, Value>>,
    #[serde(default)]
    pub help: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderInfo>,
}
