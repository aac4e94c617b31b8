use thiserror::Error;

/// Top-level error type for the `tutora-api` crate.
///
/// Covers every failure mode of the remote contract: authentication,
/// transport, structured API rejections, and response decoding.
/// `tutora-core` maps these into user-facing failures.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credentials rejected (HTTP 401) or the login payload was refused.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response. `message` is the server's `message` field when
    /// the body carries one, otherwise a short body preview.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A 2xx response lacked a field the contract requires (e.g. `token`).
    #[error("Response is missing required field `{0}`")]
    MissingField(&'static str),
}

impl Error {
    /// Returns `true` if this error indicates the bearer token is no
    /// longer accepted.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. }) || self.status() == Some(401)
    }

    /// Returns `true` if the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(e) if e.status().is_none())
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// HTTP status code, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The server-reported message of a structured API rejection.
    ///
    /// Transport and decoding failures have no server message and
    /// return `None`.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } | Self::Authentication { message } => Some(message),
            _ => None,
        }
    }
}
