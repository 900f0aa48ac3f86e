//! Backend error codes, classification and user guidance.

/// Machine-readable code sent by the backend in `error` or `detail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    MissingApiKey,
    MissingSession,
    MetaInvalid,
    CodeInvalid,
    CodeExpired,
    FloodWait,
    PhoneInvalid,
    MissingFields,
    MissingPhoneCodeHash,
    MissingPendingSession,
    InvalidCredentials,
    UserExists,
    EmptyFields,
    Unauthorized,
    Forbidden,
    NotFound,
    NotTelegram,
    UnknownProvider,
    Validation,
    KeyFormat,
    BotDisabled,
    UserNotFound,
    NoFilename,
    OnlyMp3Allowed,
    FileTooLarge,
    FileNotFound,
    TranscriptNotFound,
    ReportNotFound,
    Other(String),
}

impl ErrorCode {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "MISSING_API_KEY" | "NO_API_KEY" | "OPENAI_KEY_MISSING" => Self::MissingApiKey,
            "MISSING_SESSION" => Self::MissingSession,
            "META_INVALID" => Self::MetaInvalid,
            "CODE_INVALID" | "INVALID_CODE" => Self::CodeInvalid,
            "CODE_EXPIRED" => Self::CodeExpired,
            "FLOOD_WAIT" => Self::FloodWait,
            "PHONE_INVALID" => Self::PhoneInvalid,
            "MISSING_FIELDS" => Self::MissingFields,
            "MISSING_PHONE_CODE_HASH" => Self::MissingPhoneCodeHash,
            "MISSING_PENDING_SESSION" => Self::MissingPendingSession,
            "INVALID_CREDENTIALS" => Self::InvalidCredentials,
            "USER_EXISTS" => Self::UserExists,
            "EMPTY_FIELDS" => Self::EmptyFields,
            "UNAUTHORIZED" => Self::Unauthorized,
            "FORBIDDEN" => Self::Forbidden,
            "NOT_FOUND" => Self::NotFound,
            "NOT_TELEGRAM" => Self::NotTelegram,
            "UNKNOWN_PROVIDER" => Self::UnknownProvider,
            "VALIDATION" | "BAD_REQUEST" | "INVALID_ID" => Self::Validation,
            "KEY_FORMAT" => Self::KeyFormat,
            "BOT_DISABLED" => Self::BotDisabled,
            "USER_NOT_FOUND" => Self::UserNotFound,
            "NO_FILENAME" => Self::NoFilename,
            "ONLY_MP3_ALLOWED" => Self::OnlyMp3Allowed,
            "FILE_TOO_LARGE" => Self::FileTooLarge,
            "FILE_NOT_FOUND" => Self::FileNotFound,
            "TRANSCRIPT_NOT_FOUND" => Self::TranscriptNotFound,
            "REPORT_NOT_FOUND" => Self::ReportNotFound,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// Specific, actionable text for a recognized code.
    pub fn guidance(&self) -> &str {
        match self {
            Self::MissingApiKey => "No API key is configured. Add one under API keys and try again.",
            Self::MissingSession => {
                "The Telegram session is not activated. Activate the resource and enter the confirmation code."
            }
            Self::MetaInvalid => "The resource cannot be activated: its settings are incomplete.",
            Self::CodeInvalid => "The confirmation code is wrong. Check it and try again.",
            Self::CodeExpired => "The confirmation code has expired. Start the activation again.",
            Self::FloodWait => "Telegram asked to slow down. Wait before requesting a new code.",
            Self::PhoneInvalid => "Telegram rejected the phone number.",
            Self::MissingFields => "Fill in App ID, App Hash and phone.",
            Self::MissingPhoneCodeHash | Self::MissingPendingSession => {
                "The code request is no longer valid. Start the activation again."
            }
            Self::InvalidCredentials => "Wrong username or password.",
            Self::UserExists => "A user with this name already exists.",
            Self::EmptyFields => "Username and password are required.",
            Self::Unauthorized => "You are not logged in.",
            Self::Forbidden => "You do not have access to this resource.",
            Self::NotFound => "The resource was not found.",
            Self::NotTelegram => "This resource is not a Telegram connection.",
            Self::UnknownProvider => "Unknown provider.",
            Self::Validation => "The backend rejected the request as invalid.",
            Self::KeyFormat => "That does not look like an OpenAI key. Keys start with sk-.",
            Self::BotDisabled => "The bot is switched off. Enable it first.",
            Self::UserNotFound => "Your account was not found. Log in again.",
            Self::NoFilename => "Choose a file first.",
            Self::OnlyMp3Allowed => "Only .mp3 recordings can be uploaded.",
            Self::FileTooLarge => "The file is larger than 10 MB.",
            Self::FileNotFound => "The recording was not found. Upload it again.",
            Self::TranscriptNotFound => "There is no transcript yet. Transcribe the recording first.",
            Self::ReportNotFound => "The report was not found.",
            Self::Other(raw) => raw,
        }
    }

    /// Codes after which the pending code challenge cannot be retried.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::CodeExpired
                | Self::MissingPhoneCodeHash
                | Self::MissingPendingSession
                | Self::NotTelegram
                | Self::NotFound
        )
    }

    /// Codes that call for a specific credential prompt instead of a generic error.
    pub fn is_credential_problem(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::MissingSession)
    }
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Server,
    Rejected,
    Authentication,
    Credentials,
    Protocol,
    Validation,
    Busy,
    InvalidState,
    Configuration,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryLater,
    LogIn,
    ProvideCredentials,
    FixInput,
    WaitForPending,
    RestartFlow,
    CheckConfiguration,
    ContactSupport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive_and_accepts_aliases() {
        assert_eq!(ErrorCode::parse("code_invalid"), ErrorCode::CodeInvalid);
        assert_eq!(ErrorCode::parse("INVALID_CODE"), ErrorCode::CodeInvalid);
        assert_eq!(ErrorCode::parse(" MISSING_API_KEY "), ErrorCode::MissingApiKey);
        assert_eq!(ErrorCode::parse("key_format"), ErrorCode::KeyFormat);
        assert_eq!(ErrorCode::parse("TRANSCRIPT_NOT_FOUND"), ErrorCode::TranscriptNotFound);
    }

    #[test]
    fn unknown_codes_keep_raw_text() {
        let code = ErrorCode::parse("OPENAI_FAILED: boom");
        assert_eq!(code, ErrorCode::Other("OPENAI_FAILED: boom".to_string()));
        assert_eq!(code.guidance(), "OPENAI_FAILED: boom");
    }

    #[test]
    fn terminal_codes_are_limited_to_dead_challenges() {
        assert!(ErrorCode::MissingPendingSession.is_terminal());
        assert!(ErrorCode::CodeExpired.is_terminal());
        assert!(!ErrorCode::CodeInvalid.is_terminal());
        assert!(!ErrorCode::FloodWait.is_terminal());
    }
}
