//! Remote resources (service connections) and their client-side store.

pub mod store;

pub use store::{InFlight, ResourceStore};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

const SECRET_MARKERS: &[&str] = &["hash", "key", "secret", "session", "password", "token"];
const MASK: &str = "••••••";

/// Lifecycle status reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourceStatus {
    Active,
    Paused,
    Blocked,
    Invalid,
    Pending,
    #[serde(other)]
    Unknown,
}

impl ResourceStatus {
    /// Blocked and invalid resources cannot be toggled from the UI.
    pub fn is_toggleable(self) -> bool {
        !matches!(self, Self::Blocked | Self::Invalid)
    }
}

/// One external-service connection owned by the user.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub provider: String,
    #[serde(default)]
    pub label: String,
    pub status: ResourceStatus,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub last_error_code: Option<String>,
    #[serde(
        default,
        alias = "meta",
        alias = "meta_json",
        deserialize_with = "null_as_empty"
    )]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("id", &self.id)
            .field("provider", &self.provider)
            .field("label", &self.label)
            .field("status", &self.status)
            .field("phase", &self.phase)
            .field("last_error_code", &self.last_error_code)
            .field("metadata", &Value::Object(self.redacted_metadata()))
            .finish()
    }
}

impl Resource {
    /// Metadata safe for display.
    ///
    /// Anything stored under a secret-looking key is masked, including
    /// numbers and every leaf of nested objects or arrays. Other containers
    /// are searched at any depth.
    pub fn redacted_metadata(&self) -> Map<String, Value> {
        redact_map(&self.metadata)
    }

    /// The error to show next to the resource: the backend's code, else the phase-level error.
    pub fn display_error(&self) -> Option<&str> {
        self.last_error_code
            .as_deref()
            .or_else(|| self.metadata.get("error").and_then(Value::as_str))
    }
}

fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SECRET_MARKERS.iter().any(|marker| key.contains(marker))
}

fn redact_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), redact_value(value, is_secret_key(key))))
        .collect()
}

fn redact_value(value: &Value, secret: bool) -> Value {
    match value {
        Value::Object(inner) if secret => Value::Object(
            inner
                .iter()
                .map(|(key, value)| (key.clone(), redact_value(value, true)))
                .collect(),
        ),
        Value::Object(inner) => Value::Object(redact_map(inner)),
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_value(v, secret)).collect()),
        Value::String(s) if secret && !s.is_empty() => Value::String(MASK.to_string()),
        Value::Number(_) if secret => Value::String(MASK.to_string()),
        other => other.clone(),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_list_item_with_meta_alias_and_unknown_status() {
        let resource: Resource = serde_json::from_value(json!({
            "id": "r1",
            "provider": "telegram",
            "label": "Sales",
            "status": "draft",
            "phase": "awaiting_code",
            "last_error_code": null,
            "meta": {"creds": {"app_id": "1", "app_hash": "h"}}
        }))
        .unwrap();

        assert_eq!(resource.status, ResourceStatus::Unknown);
        assert_eq!(resource.phase.as_deref(), Some("awaiting_code"));
        assert_eq!(resource.metadata["creds"]["app_id"], "1");
    }

    #[test]
    fn redaction_masks_nested_secrets_only() {
        let resource: Resource = serde_json::from_value(json!({
            "id": "r1",
            "provider": "telegram",
            "status": "active",
            "meta_json": {
                "creds": {"app_id": "42", "app_hash": "deadbeef", "string_session": "1AbC"},
                "extra": {"phone_e164": "+100", "openai_api_key": ""}
            }
        }))
        .unwrap();

        let redacted = resource.redacted_metadata();
        assert_eq!(redacted["creds"]["app_id"], "42");
        assert_eq!(redacted["creds"]["app_hash"], MASK);
        assert_eq!(redacted["creds"]["string_session"], MASK);
        assert_eq!(redacted["extra"]["openai_api_key"], "");
        assert!(!format!("{resource:?}").contains("deadbeef"));
    }

    #[test]
    fn redaction_reaches_arrays_and_non_string_secrets() {
        let resource: Resource = serde_json::from_value(json!({
            "id": "r1",
            "provider": "telegram",
            "status": "active",
            "meta_json": {
                "accounts": [{"name": "main", "token": "tok-1"}],
                "openai_api_key": {"value": "sk-abcdefghijklmnopqrstu"},
                "session_ids": ["s-1", "s-2"],
                "pin_token": 123456,
                "has_session": true
            }
        }))
        .unwrap();

        let redacted = resource.redacted_metadata();
        assert_eq!(redacted["accounts"][0]["name"], "main");
        assert_eq!(redacted["accounts"][0]["token"], MASK);
        assert_eq!(redacted["openai_api_key"]["value"], MASK);
        assert_eq!(redacted["session_ids"], json!([MASK, MASK]));
        assert_eq!(redacted["pin_token"], MASK);
        assert_eq!(redacted["has_session"], true);
        let debug = format!("{resource:?}");
        assert!(!debug.contains("sk-abc"));
        assert!(!debug.contains("tok-1"));
        assert!(!debug.contains("123456"));
    }

    #[test]
    fn null_metadata_decodes_as_empty() {
        let items: Vec<Resource> = serde_json::from_value(json!([
            {"id": "r1", "provider": "telegram", "status": "active", "meta": null},
            {"id": "r2", "provider": "zoom", "status": "paused", "meta_json": null}
        ]))
        .unwrap();

        assert_eq!(items.len(), 2);
        assert!(items[0].metadata.is_empty());
        assert!(items[1].metadata.is_empty());
    }

    #[test]
    fn status_text_round_trips_through_strum() {
        assert_eq!(ResourceStatus::Paused.to_string(), "paused");
        assert_eq!("active".parse::<ResourceStatus>().unwrap(), ResourceStatus::Active);
        assert!(!ResourceStatus::Blocked.is_toggleable());
        assert!(ResourceStatus::Pending.is_toggleable());
    }
}
