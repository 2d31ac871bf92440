// Shared transport configuration for building reqwest::Client instances.
//
// Token-bearing and unauthenticated clients share TLS and timeout settings
// through this module, avoiding duplicated builder logic.

use std::time::Duration;

/// TLS verification mode.
///
/// Tenant-view NCE deployments frequently sit behind self-signed or
/// region-local certificates, so verification is a first-class toggle.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Accept any certificate (for self-signed deployments).
    #[default]
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        self.builder()
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Build a `reqwest::Client` with additional default headers.
    ///
    /// Used by [`crate::NbiClient`] to inject the `X-ACCESS-TOKEN` header.
    pub fn build_client_with_headers(
        &self,
        headers: reqwest::header::HeaderMap,
    ) -> Result<reqwest::Client, crate::error::Error> {
        self.builder()
            .default_headers(headers)
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    fn builder(&self) -> reqwest::ClientBuilder {
        let builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("nce-cli/0.1.0");

        match self.tls {
            TlsMode::System => builder,
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        }
    }
}
