//! Backend path table.

use serde::{Deserialize, Serialize};

/// Path templates for every backend action; `{id}` is replaced by the resource id.
///
/// Each field can be overridden from the `[endpoints]` table of `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
    pub resources_list: String,
    pub resource_detail: String,
    pub resource_toggle: String,
    pub resource_add: String,
    pub resource_delete: String,
    pub activate: String,
    pub bot_status: String,
    pub bot_toggle: String,
    pub bot_preflight: String,
    pub bot_start: String,
    pub bot_stop: String,
    pub bot_state: String,
    pub openai_settings: String,
    pub openai_test: String,
    pub openai_save: String,
    pub zoom_items: String,
    pub zoom_reports: String,
    pub zoom_upload: String,
    pub zoom_process: String,
    pub zoom_report: String,
    pub zoom_report_open: String,
    pub login: String,
    pub register: String,
    pub logout: String,
    pub me: String,
    pub providers: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            resources_list: "/api/resources/list".to_string(),
            resource_detail: "/api/resources/{id}".to_string(),
            resource_toggle: "/api/resources/toggle".to_string(),
            resource_add: "/api/resources/add".to_string(),
            resource_delete: "/api/providers/resource/{id}".to_string(),
            activate: "/api/resource/{id}/activate".to_string(),
            bot_status: "/api/bot/status".to_string(),
            bot_toggle: "/api/bot/toggle".to_string(),
            bot_preflight: "/api/preflight".to_string(),
            bot_start: "/api/bot/start".to_string(),
            bot_stop: "/api/bot/stop".to_string(),
            bot_state: "/api/bot/state".to_string(),
            openai_settings: "/api/profile/openai".to_string(),
            openai_test: "/api/profile/openai/test".to_string(),
            openai_save: "/api/profile/openai/save".to_string(),
            zoom_items: "/api/zoom/{id}/items".to_string(),
            zoom_reports: "/api/zoom/{id}/reports".to_string(),
            zoom_upload: "/api/zoom/{id}/upload".to_string(),
            zoom_process: "/api/zoom/{id}/process".to_string(),
            zoom_report: "/api/zoom/{id}/report".to_string(),
            zoom_report_open: "/api/zoom/{id}/report/open".to_string(),
            login: "/api/auth/login".to_string(),
            register: "/api/auth/register".to_string(),
            logout: "/api/auth/logout".to_string(),
            me: "/api/auth/me".to_string(),
            providers: "/api/providers/list".to_string(),
        }
    }
}
