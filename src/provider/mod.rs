//! Identity provider boundary.
//!
//! The flow never validates a credential itself; these are the external
//! calls it orchestrates. [`GoTrueClient`] is the HTTP implementation;
//! tests drive the flow with scripted in-memory implementations.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod gotrue;

pub use gotrue::GoTrueClient;

/// Categories of provider failures for consistent error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Connection or request timeout
    Timeout,
    /// Connection failure or other transport error
    Network,
    /// Failed to parse a response or build a request URL
    Parse,
    /// API-level error returned by the provider
    ApiError,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::HttpStatus => write!(f, "http_status"),
            ProviderErrorKind::Timeout => write!(f, "timeout"),
            ProviderErrorKind::Network => write!(f, "network"),
            ProviderErrorKind::Parse => write!(f, "parse"),
            ProviderErrorKind::ApiError => write!(f, "api_error"),
        }
    }
}

/// Structured error from the identity provider.
///
/// `message` is what the presentation layer renders verbatim as the flow's
/// `last_error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderError {
    /// Error category
    pub kind: ProviderErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ProviderError {
    /// Creates a new provider error.
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error, extracting the human-readable message
    /// from a GoTrue error body when one is present.
    ///
    /// GoTrue reports failures as `{"msg": ...}`, `{"error_description":
    /// ...}`, or `{"message": ...}` depending on the endpoint.
    pub fn http_status(status: u16, body: &str) -> Self {
        if let Some(message) = extract_gotrue_message(body) {
            return Self {
                kind: ProviderErrorKind::HttpStatus,
                message,
                details: Some(body.to_string()),
            };
        }
        Self {
            kind: ProviderErrorKind::HttpStatus,
            message: format!("HTTP {status}"),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message)
    }
}

fn extract_gotrue_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    for key in ["msg", "error_description", "message"] {
        if let Some(message) = json.get(key).and_then(Value::as_str) {
            return Some(message.to_string());
        }
    }
    None
}

impl fmt::Display for ProviderError {
    // Only the message, so errors surface verbatim in the UI.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}

/// The external identity provider consumed by the flow.
///
/// Implementations perform the actual credential operations; the flow only
/// decides when each call is made. Futures are `Send` so the runtime can
/// spawn them.
pub trait IdentityProvider: Send + Sync {
    /// Creates an account; the provider sends an out-of-band confirmation
    /// email.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Email/password sign-in.
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Dispatches a 6-digit code by SMS; provider-side expiry is assumed to
    /// be at least the flow's own 600 s window.
    fn send_otp(&self, phone_e164: &str) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Verifies an entered code.
    fn verify_otp(
        &self,
        phone_e164: &str,
        code: &str,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Initiates a password reset email.
    fn reset_password(
        &self,
        email: &str,
        redirect_url: &str,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Hands control to a federated provider via a full redirect; there is
    /// no synchronous result path back into the flow on success.
    fn federated_sign_in(
        &self,
        provider: &str,
        redirect_url: &str,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: GoTrue "msg" bodies surface their message verbatim.
    #[test]
    fn test_http_status_extracts_msg() {
        let err = ProviderError::http_status(400, r#"{"code":400,"msg":"Invalid login credentials"}"#);
        assert_eq!(err.kind, ProviderErrorKind::HttpStatus);
        assert_eq!(err.message, "Invalid login credentials");
        assert!(err.details.is_some());
    }

    /// Test: OAuth-style "error_description" bodies are also understood.
    #[test]
    fn test_http_status_extracts_error_description() {
        let err = ProviderError::http_status(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err.message, "Invalid login credentials");
    }

    /// Test: unparseable bodies fall back to the status line with the raw
    /// body kept as details.
    #[test]
    fn test_http_status_fallback_keeps_body() {
        let err = ProviderError::http_status(502, "bad gateway");
        assert_eq!(err.message, "HTTP 502");
        assert_eq!(err.details.as_deref(), Some("bad gateway"));
    }

    /// Test: empty bodies produce no details.
    #[test]
    fn test_http_status_empty_body() {
        let err = ProviderError::http_status(500, "");
        assert_eq!(err.message, "HTTP 500");
        assert!(err.details.is_none());
    }

    /// Test: Display prints only the message (what the UI renders).
    #[test]
    fn test_display_is_message_only() {
        let err = ProviderError::new(ProviderErrorKind::ApiError, "Phone rate limit exceeded");
        assert_eq!(err.to_string(), "Phone rate limit exceeded");
    }
}
