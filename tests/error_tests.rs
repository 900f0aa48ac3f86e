//! Tests for error classification and user-facing text.

use dashclient::error::{ClientError, ErrorCategory, ErrorCode, RecoverySuggestion};
use pretty_assertions::assert_eq;

fn server(status: u16, code: Option<&str>, message: Option<&str>) -> ClientError {
    ClientError::Server {
        status,
        code: code.map(str::to_string),
        message: message.map(str::to_string),
        issues: Vec::new(),
        retry_after_secs: None,
    }
}

#[test]
fn known_codes_get_specific_guidance() {
    let err = ClientError::server(400, "META_INVALID");
    assert_eq!(
        err.user_message("Toggle failed"),
        "The resource cannot be activated: its settings are incomplete."
    );
    assert_eq!(err.error_code(), Some(ErrorCode::MetaInvalid));
}

#[test]
fn unknown_code_is_shown_with_message() {
    let err = server(500, Some("OPENAI_FAILED"), Some("quota exceeded"));
    assert_eq!(err.user_message("Toggle failed"), "OPENAI_FAILED: quota exceeded");
}

#[test]
fn message_without_code_is_shown_verbatim() {
    let err = server(400, None, Some("label too long"));
    assert_eq!(err.user_message("Save failed"), "label too long");
}

#[test]
fn bare_status_falls_back() {
    assert_eq!(server(502, None, None).user_message("Save failed"), "Save failed");
}

#[test]
fn flood_wait_mentions_delay_and_issues_are_listed() {
    let err = ClientError::Server {
        status: 429,
        code: Some("FLOOD_WAIT".to_string()),
        message: None,
        issues: vec!["phone".to_string()],
        retry_after_secs: Some(42),
    };
    let text = err.user_message("Activation failed");
    assert!(text.ends_with("(retry in 42s) (phone)"), "{text}");
}

#[test]
fn local_errors_render_their_own_text() {
    assert_eq!(
        ClientError::Validation("Choose a provider".to_string()).user_message("x"),
        "Choose a provider"
    );
    assert_eq!(
        ClientError::Busy {
            resource_id: "r1".to_string()
        }
        .user_message("x"),
        "A request for this resource is already in progress"
    );
    assert_eq!(
        ClientError::Timeout(500).user_message("Toggle failed"),
        "Toggle failed: no response in time"
    );
}

#[test]
fn categories_follow_status_and_code() {
    assert_eq!(ClientError::server(400, "MISSING_API_KEY").category(), ErrorCategory::Credentials);
    assert_eq!(ClientError::server(400, "MISSING_SESSION").category(), ErrorCategory::Credentials);
    assert_eq!(server(401, None, None).category(), ErrorCategory::Authentication);
    assert_eq!(server(503, None, None).category(), ErrorCategory::Server);
    assert_eq!(server(409, None, None).category(), ErrorCategory::Rejected);
    assert_eq!(ClientError::Timeout(1).category(), ErrorCategory::Network);
    assert_eq!(
        ClientError::Protocol("x".to_string()).category(),
        ErrorCategory::Protocol
    );
}

#[test]
fn recovery_suggestions_match_category() {
    assert_eq!(
        ClientError::server(400, "MISSING_API_KEY").recovery_suggestion(),
        RecoverySuggestion::ProvideCredentials
    );
    assert_eq!(server(403, None, None).recovery_suggestion(), RecoverySuggestion::LogIn);
    assert_eq!(
        ClientError::Busy {
            resource_id: "r1".to_string()
        }
        .recovery_suggestion(),
        RecoverySuggestion::WaitForPending
    );
}

#[test]
fn dead_challenge_and_rejected_session_are_unrecoverable() {
    assert!(ClientError::server(400, "CODE_INVALID").is_recoverable());
    assert!(ClientError::server(400, "FLOOD_WAIT").is_recoverable());
    assert!(!ClientError::server(400, "MISSING_PHONE_CODE_HASH").is_recoverable());
    assert!(!ClientError::server(400, "code_expired").is_recoverable());
    assert!(!ClientError::InvalidState("x".to_string()).is_recoverable());
    assert!(!server(401, None, Some("Not authenticated")).is_recoverable());
    assert!(!ClientError::server(403, "FORBIDDEN").is_recoverable());
    assert!(server(500, None, None).is_recoverable());
    assert!(ClientError::Timeout(10).is_recoverable());
}

#[test]
fn display_includes_status_and_code() {
    let err = ClientError::server(400, "CODE_INVALID");
    assert_eq!(err.to_string(), "Server error (status 400): CODE_INVALID");
}
