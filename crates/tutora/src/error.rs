//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use tutora_config::ConfigError;
use tutora_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the platform at {url}")]
    #[diagnostic(
        code(tutora::connection_failed),
        help(
            "Check your network connection and the profile's api_url.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(tutora::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(tutora::auth_failed),
        help(
            "Check your mobile number and password.\n\
             Store a password with: tutora config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("Not signed in")]
    #[diagnostic(code(tutora::not_signed_in), help("Run: tutora login"))]
    NotSignedIn,

    #[error("No active child selected")]
    #[diagnostic(
        code(tutora::no_active_child),
        help(
            "List profiles with: tutora children list\n\
             Then run: tutora children switch <id>"
        )
    )]
    NoActiveChild,

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(tutora::no_credentials),
        help(
            "Store one with: tutora config set-password\n\
             Or set the TUTORA_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Server rejections ────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(tutora::rejected))]
    Rejected { message: String, status: Option<u16> },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tutora::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(tutora::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(tutora::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: tutora config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No API URL configured")]
    #[diagnostic(
        code(tutora::no_config),
        help(
            "Create a profile with: tutora config init\n\
             Or pass --api-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(tutora::config))]
    Config(ConfigError),

    #[error("Local session state is unusable: {message}")]
    #[diagnostic(
        code(tutora::storage),
        help("Remove the state file and sign in again.")
    )]
    Storage { message: String },

    // ── IO / internal ────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(tutora::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NotSignedIn | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::Rejected {
                status: Some(404), ..
            }
            | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected {
                status: Some(409), ..
            } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::NoActiveChild
            | Self::NonInteractiveRequiresYes { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout => CliError::Timeout,
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::NotAuthenticated => CliError::NotSignedIn,
            CoreError::NoActiveChild => CliError::NoActiveChild,
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Api { message, status } => CliError::Rejected { message, status },
            CoreError::Storage(e) => CliError::Storage {
                message: e.to_string(),
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::ProfileNotFound(name) => CliError::ProfileNotFound {
                name,
                available: "(see: tutora config profiles)".into(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

impl From<tutora_core::StorageError> for CliError {
    fn from(err: tutora_core::StorageError) -> Self {
        CliError::Storage {
            message: err.to_string(),
        }
    }
}
