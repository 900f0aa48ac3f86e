//! Configuration system (layered: code > env > config file > defaults).

pub mod endpoints;

pub use endpoints::EndpointPaths;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ClientError, Result};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_SESSION_COOKIE: &str = "session";

/// Resolved client configuration.
///
/// Resolution order for each field:
/// 1. Values set in code (`with_*` methods)
/// 2. Environment (`DASHCLIENT_BASE_URL`, `DASHCLIENT_SESSION_COOKIE`,
///    `DASHCLIENT_TIMEOUT_SECS`), `.env` included
/// 3. `config.toml` (path from `DASHCLIENT_CONFIG`, else the user config dir)
/// 4. Built-in defaults
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub session_cookie: String,
    /// Upper bound a caller may put around a single request. The gateway itself never times out.
    pub timeout: Option<Duration>,
    pub endpoints: EndpointPaths,
    pub state_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            timeout: None,
            endpoints: EndpointPaths::default(),
            state_dir: default_state_dir(),
        }
    }
}

/// On-disk shape of `config.toml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    base_url: Option<String>,
    session_cookie: Option<String>,
    timeout_secs: Option<u64>,
    endpoints: Option<EndpointPaths>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_session_cookie(mut self, name: impl Into<String>) -> Self {
        self.session_cookie = name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_endpoints(mut self, endpoints: EndpointPaths) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_state_dir(mut self, dir: PathBuf) -> Self {
        self.state_dir = dir;
        self
    }

    /// Load defaults, then the config file (if any), then the environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let path = std::env::var("DASHCLIENT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_state_dir().join("config.toml"));
        let mut config = Self::default();
        if path.exists() {
            config = config.merge_file(&path)?;
        }
        config.apply_env()
    }

    /// Defaults overlaid with the environment only.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::default().apply_env()
    }

    /// Overlay a `config.toml` onto this config.
    pub fn merge_file(mut self, path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&raw).map_err(|e| {
            ClientError::Configuration(format!("{}: {e}", path.display()))
        })?;
        if let Some(url) = file.base_url {
            self = self.with_base_url(url);
        }
        if let Some(name) = file.session_cookie {
            self.session_cookie = name;
        }
        if let Some(secs) = file.timeout_secs {
            self.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(endpoints) = file.endpoints {
            self.endpoints = endpoints;
        }
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(self)
    }

    fn apply_env(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var("DASHCLIENT_BASE_URL") {
            self = self.with_base_url(url);
        }
        if let Ok(name) = std::env::var("DASHCLIENT_SESSION_COOKIE") {
            self.session_cookie = name;
        }
        if let Ok(raw) = std::env::var("DASHCLIENT_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Configuration(format!("DASHCLIENT_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            self.timeout = Some(Duration::from_secs(secs));
        }
        Ok(self)
    }

    /// Validate and parse the base URL.
    pub fn parsed_base_url(&self) -> Result<reqwest::Url> {
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base URL {}: {e}", self.base_url)))
    }
}

fn default_state_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "dashclient")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".dashclient"))
}
