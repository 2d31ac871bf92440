//! Wire types for the NCE-Campus northbound API.
//!
//! Resource payloads are free-form JSON objects whose field inventory varies
//! by deployment and API version, so records stay dynamic. Only envelopes
//! with a fixed, documented shape get structs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One remote resource object (a site, a device, ...) as returned by the
/// API: an arbitrarily nested string-keyed mapping.
///
/// Identified by a server-assigned `id`; usually also carries a
/// human-meaningful `name`. The client never assigns or rewrites `id`.
pub type Record = serde_json::Map<String, Value>;

// ── Token endpoint ───────────────────────────────────────────────────

/// Response envelope from `POST /controller/v2/tokens`.
///
/// The token usually arrives under `data.token_id`, but some deployments
/// flatten it to a top-level `token_id`; both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub data: Option<TokenData>,
    #[serde(default)]
    pub token_id: Option<String>,
    /// ISO 8601 expiry, when the deployment reports one.
    #[serde(default, rename = "expiredDate")]
    pub expired_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenData {
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default, rename = "expiredDate")]
    pub expired_date: Option<String>,
}

impl TokenResponse {
    /// The token value, wherever the deployment put it.
    pub fn token(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.token_id.as_deref())
            .or(self.token_id.as_deref())
    }
}
