//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` / `nce_api::Error` variants into user-facing errors
//! with actionable help text and per-class exit codes.

use miette::Diagnostic;
use thiserror::Error;

use nce_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const AMBIGUOUS: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the NCE API at {url}")]
    #[diagnostic(
        code(nce::connection_failed),
        help(
            "Check that the base URI is correct and reachable.\n\
             URL: {url}\n\
             Self-signed deployments may need --insecure (-k)."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(nce::timeout),
        help("Increase --timeout or check API responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(nce::auth_failed),
        help(
            "Verify the token or credentials.\n\
             Obtain a fresh token with: nce auth login"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(nce::no_credentials),
        help(
            "Set NCE_TOKEN, or configure username/password in the profile\n\
             and run: nce auth login"
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(nce::not_found),
        help("Run: nce {resource_type}s list to see available records")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("Selector matched {count} records; expected exactly one")]
    #[diagnostic(
        code(nce::ambiguous),
        help(
            "Refine the selector (it may include 'name' for rename).\n\
             Matches (bounded preview): {preview}"
        )
    )]
    Ambiguous { count: usize, preview: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(nce::api_error))]
    ApiError {
        status: u16,
        message: String,
        code: Option<String>,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nce::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(nce::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No base URI configured")]
    #[diagnostic(
        code(nce::no_config),
        help(
            "Pass --base-uri, set NCE_BASE_URI, or add a profile to the\n\
             config file at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(nce::config))]
    Config(Box<figment::Error>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(nce::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(nce::json), help("Check the JSON contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Ambiguous { .. } => exit_code::AMBIGUOUS,
            Self::Validation { .. }
            | Self::Json(_)
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── nce_api::Error → CliError ────────────────────────────────────────

impl From<nce_api::Error> for CliError {
    fn from(err: nce_api::Error) -> Self {
        match err {
            nce_api::Error::Authentication { message } => Self::AuthFailed { message },

            nce_api::Error::TokenMissing { body } => Self::AuthFailed {
                message: format!("token not found in response: {body}"),
            },

            nce_api::Error::Transport(e) => {
                if e.is_timeout() {
                    // Timeout length is transport-owned; report the class only.
                    Self::Timeout { seconds: 0 }
                } else {
                    Self::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "(unknown)".to_owned(), ToString::to_string),
                        source: e.into(),
                    }
                }
            }

            nce_api::Error::InvalidUrl(e) => Self::Validation {
                field: "base-uri".into(),
                reason: e.to_string(),
            },

            nce_api::Error::Tls(message) => Self::ConnectionFailed {
                url: "(tls)".into(),
                source: message.into(),
            },

            nce_api::Error::Api {
                status,
                message,
                code,
            } => Self::ApiError {
                status,
                message,
                code,
            },

            nce_api::Error::Deserialization { message, .. } => Self::ApiError {
                status: 0,
                message: format!("unreadable response: {message}"),
                code: None,
            },
        }
    }
}

// ── CoreError → CliError ─────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingName => Self::Validation {
                field: "object.name".into(),
                reason: "required for all operations (present/absent)".into(),
            },

            CoreError::AmbiguousMatch { count, preview } => Self::Ambiguous {
                count,
                preview: serde_json::to_string(&preview).unwrap_or_default(),
            },

            CoreError::MissingId { kind, id_key } => Self::ApiError {
                status: 0,
                message: format!("{kind} record has no usable '{id_key}' field"),
                code: None,
            },

            CoreError::ResolveNoMatch => Self::NotFound {
                resource_type: "resource".into(),
                identifier: "(criteria)".into(),
            },

            CoreError::ResolveAmbiguous { count } => Self::Ambiguous {
                count,
                preview: String::new(),
            },

            CoreError::UnsupportedResource(kind) => Self::Validation {
                field: "resource".into(),
                reason: format!("expected 'sites' or 'devices', got '{kind}'"),
            },

            CoreError::Api(e) => e.into(),
        }
    }
}
