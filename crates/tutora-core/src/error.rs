// ── Core error types ──
//
// User-facing errors from tutora-core. Consumers never see raw HTTP
// status codes or JSON parse failures directly: the `From<tutora_api::Error>`
// impl translates transport-layer errors into workflow failures.

use thiserror::Error;

use crate::storage::StorageError;

/// Unified error type for the core crate.
///
/// The variant is the machine-readable failure state; [`user_message`]
/// is what a front end shows.
///
/// [`user_message`]: CoreError::user_message
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local validation (no request was sent) ───────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("No active child selected")]
    NoActiveChild,

    // ── Remote failures ──────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot reach the platform at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    #[error("{message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Local persistence ────────────────────────────────────────────
    #[error("Local storage error: {0}")]
    Storage(#[from] StorageError),

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Message suitable for showing to the person using the app.
    ///
    /// Server rejections are surfaced verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. }
            | Self::Validation { message }
            | Self::AuthenticationFailed { message } => message.clone(),
            Self::NotAuthenticated => "Please sign in first.".into(),
            Self::NoActiveChild => "Select a child profile first.".into(),
            Self::ConnectionFailed { .. } | Self::Timeout => {
                "The platform could not be reached. Check your connection and try again.".into()
            }
            other => other.to_string(),
        }
    }

    /// `true` when the failure was detected before any request was sent.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::NotAuthenticated | Self::NoActiveChild
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<tutora_api::Error> for CoreError {
    fn from(err: tutora_api::Error) -> Self {
        match err {
            tutora_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            tutora_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() || e.is_request() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            tutora_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            tutora_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            tutora_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            tutora_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            tutora_api::Error::MissingField(field) => CoreError::Api {
                message: format!("unexpected server response: missing `{field}`"),
                status: None,
            },
        }
    }
}
