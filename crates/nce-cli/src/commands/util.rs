//! Shared helpers for command handlers.

use serde_json::Value;

use nce_api::NbiClient;
use nce_core::Record;

use crate::cli::GlobalOpts;
use crate::config::{self, AuthSource};
use crate::error::CliError;

/// Build an authenticated client from config + flags.
///
/// With a ready token this is local; with username/password it performs one
/// token-issuance round trip first.
pub async fn connect(global: &GlobalOpts) -> Result<NbiClient, CliError> {
    let settings = config::resolve_settings(global)?;
    let transport = settings.transport();

    match &settings.auth {
        AuthSource::Token(token) => {
            Ok(NbiClient::with_token(&settings.base_uri, token, &transport)?)
        }
        AuthSource::Credentials { username, password } => {
            let anonymous = NbiClient::new(&settings.base_uri, &transport)?;
            let token = anonymous.obtain_token(username, password).await?;
            Ok(NbiClient::with_token(&settings.base_uri, &token, &transport)?)
        }
    }
}

/// Parse a `--object`/`--selector` argument: inline JSON or `@file`.
pub fn parse_json_arg(field: &str, raw: &str) -> Result<Record, CliError> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => raw.to_owned(),
    };

    let value: Value = serde_json::from_str(&text).map_err(|e| CliError::Validation {
        field: field.to_owned(),
        reason: format!("invalid JSON: {e}"),
    })?;

    value
        .as_object()
        .cloned()
        .ok_or_else(|| CliError::Validation {
            field: field.to_owned(),
            reason: "expected a JSON object".into(),
        })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// A record field as display text; `-` when absent.
pub fn field(record: &Record, key: &str) -> String {
    record.get(key).map_or_else(|| "-".to_owned(), value_text)
}

/// A value as display text (strings unquoted).
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `key: value` lines for a single-record detail view.
pub fn record_detail(record: &Record) -> String {
    record
        .iter()
        .map(|(k, v)| format!("{k}: {}", value_text(v)))
        .collect::<Vec<_>>()
        .join("\n")
}
