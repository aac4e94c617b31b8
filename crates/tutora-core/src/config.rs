// ── Runtime client configuration ──
//
// Describes *how* to reach the platform. Never touches disk: the CLI
// (or any other front end) builds a `ClientConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use tutora_api::{TlsMode, TransportConfig};

/// Configuration for talking to one platform deployment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g. `https://api.tutora.example/api`).
    pub api_url: Url,
    /// Per-request timeout. `None` means the transport decides.
    pub timeout: Option<Duration>,
    /// Extra CA certificate to trust.
    pub ca_cert: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            timeout: None,
            ca_cert: None,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let mut transport = TransportConfig::default();
        transport.timeout = self.timeout;
        if let Some(ref ca) = self.ca_cert {
            transport.tls = TlsMode::CustomCa(ca.clone());
        }
        transport
    }
}
