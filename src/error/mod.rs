//! Error types for dashclient.

pub mod unified;

pub use unified::{ErrorCategory, ErrorCode, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for every gateway, store and flow operation.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status or `ok: false`.
    #[error("Server error (status {status}): {}", describe(.code, .message))]
    Server {
        status: u16,
        code: Option<String>,
        message: Option<String>,
        issues: Vec<String>,
        retry_after_secs: Option<u64>,
    },

    /// The response body does not satisfy the expected contract.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A required field was empty; nothing was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Resource {resource_id} already has a request in flight")]
    Busy { resource_id: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Create a server error carrying only a status and machine code.
    pub fn server(status: u16, code: impl Into<String>) -> Self {
        Self::Server {
            status,
            code: Some(code.into()),
            message: None,
            issues: Vec::new(),
            retry_after_secs: None,
        }
    }

    /// The machine-readable backend code, if the server sent one.
    pub fn server_code(&self) -> Option<&str> {
        match self {
            Self::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Typed view of [`Self::server_code`].
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.server_code().map(ErrorCode::parse)
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) | Self::Timeout(_) => ErrorCategory::Network,
            Self::Protocol(_) | Self::Serialization(_) => ErrorCategory::Protocol,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Busy { .. } => ErrorCategory::Busy,
            Self::InvalidState(_) => ErrorCategory::InvalidState,
            Self::Configuration(_) | Self::Io(_) => ErrorCategory::Configuration,
            Self::Server { status, .. } => match self.error_code() {
                Some(code) if code.is_credential_problem() => ErrorCategory::Credentials,
                _ => match status {
                    401 | 403 => ErrorCategory::Authentication,
                    500..=599 => ErrorCategory::Server,
                    _ => ErrorCategory::Rejected,
                },
            },
        }
    }

    /// Whether the same step may be attempted again with corrected input.
    ///
    /// Server codes saying the pending challenge is gone are terminal, and so
    /// is a rejected session (401/403): a new code cannot fix either.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Server { .. } => {
                self.category() != ErrorCategory::Authentication
                    && !self.error_code().is_some_and(|code| code.is_terminal())
            }
            Self::InvalidState(_) | Self::Configuration(_) => false,
            _ => true,
        }
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Credentials => RecoverySuggestion::ProvideCredentials,
            ErrorCategory::Authentication => RecoverySuggestion::LogIn,
            ErrorCategory::Network | ErrorCategory::Server => RecoverySuggestion::RetryLater,
            ErrorCategory::Busy => RecoverySuggestion::WaitForPending,
            ErrorCategory::Validation | ErrorCategory::Rejected => RecoverySuggestion::FixInput,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::InvalidState => RecoverySuggestion::RestartFlow,
            ErrorCategory::Protocol => RecoverySuggestion::ContactSupport,
        }
    }

    /// Convert this failure into the status line shown to the user.
    ///
    /// Recognized backend codes map to specific guidance; other codes and
    /// messages are surfaced verbatim; everything else falls back to
    /// `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Server {
                code,
                message,
                issues,
                retry_after_secs,
                ..
            } => {
                let mut text = match code.as_deref().map(ErrorCode::parse) {
                    Some(ErrorCode::Other(raw)) => match message {
                        Some(msg) => format!("{raw}: {msg}"),
                        None => raw,
                    },
                    Some(known) => known.guidance().to_string(),
                    None => message.clone().unwrap_or_else(|| fallback.to_string()),
                };
                if let Some(secs) = retry_after_secs {
                    text.push_str(&format!(" (retry in {secs}s)"));
                }
                if !issues.is_empty() {
                    text.push_str(&format!(" ({})", issues.join(", ")));
                }
                text
            }
            Self::Validation(msg) | Self::InvalidState(msg) => msg.clone(),
            Self::Busy { .. } => "A request for this resource is already in progress".to_string(),
            Self::Network(_) => format!("{fallback}: backend unreachable"),
            Self::Timeout(_) => format!("{fallback}: no response in time"),
            _ => fallback.to_string(),
        }
    }
}

fn describe(code: &Option<String>, message: &Option<String>) -> String {
    code.as_deref()
        .or(message.as_deref())
        .unwrap_or("no details")
        .to_string()
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ClientError>;
