//! CLI-owned configuration: TOML profiles, credential resolution, and
//! translation to transport/auth settings.
//!
//! The core crates never see these types -- they receive a pre-built
//! `NbiClient`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use nce_api::{TlsMode, TransportConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config structs ──────────────────────────────────────────────

/// CLI-owned TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name (used when --profile is not specified).
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// One named API endpoint + credentials.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// API base URI (scheme + host + port), e.g. "https://weu.naas.huawei.com:18002".
    pub base_uri: String,

    /// Access token (plaintext -- prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the access token.
    pub token_env: Option<String>,

    /// Username for on-the-fly token issuance.
    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring).
    pub password: Option<String>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Resolved settings ────────────────────────────────────────────────

/// Everything needed to build an authenticated `NbiClient`.
pub struct ClientSettings {
    pub base_uri: String,
    pub tls: TlsMode,
    pub timeout: Duration,
    pub auth: AuthSource,
}

/// Where the access token comes from.
pub enum AuthSource {
    /// A ready token.
    Token(SecretString),
    /// Username/password for token issuance at connect time.
    Credentials {
        username: String,
        password: SecretString,
    },
}

impl ClientSettings {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("fr", "cd60", "nce")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        })
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("nce");
    p
}

// ── Config loading ───────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, CliError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("NCE_CONFIG_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Profile resolution ───────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Resolve client settings from config + profile + CLI overrides.
///
/// This is the single boundary where CLI config crosses into API types.
pub fn resolve_settings(global: &GlobalOpts) -> Result<ClientSettings, CliError> {
    let config = load_config_or_default();
    let profile_name = active_profile_name(global, &config);
    let profile = config.profiles.get(&profile_name);

    // An explicitly requested profile must exist.
    if global.profile.is_some() && profile.is_none() {
        let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available.join(", "),
        });
    }

    // 1. Base URI (flag > env > profile). No hardcoded regional default:
    //    pointing at the wrong tenant endpoint is worse than an error.
    let base_uri = global
        .base_uri
        .clone()
        .or_else(|| profile.map(|p| p.base_uri.clone()))
        .ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;

    // 2. TLS verification
    let insecure = global.insecure
        || profile.and_then(|p| p.insecure).unwrap_or(config.defaults.insecure);
    let tls = if insecure {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };

    // 3. Timeout (flag wins; profile applies when the flag is at its default)
    let seconds = match profile.and_then(|p| p.timeout) {
        Some(t) if global.timeout == default_timeout() => t,
        _ => global.timeout,
    };
    let timeout = Duration::from_secs(seconds);

    // 4. Auth: ready token preferred, credentials as fallback.
    let auth = if let Some(token) = resolve_token(global, profile, &profile_name) {
        AuthSource::Token(token)
    } else if let Some((username, password)) =
        resolve_credentials(global, profile, &profile_name)
    {
        AuthSource::Credentials { username, password }
    } else {
        return Err(CliError::NoCredentials {
            profile: profile_name,
        });
    };

    Ok(ClientSettings {
        base_uri,
        tls,
        timeout,
        auth,
    })
}

// ── Credential helpers ───────────────────────────────────────────────

/// Resolve an access token from the credential chain.
fn resolve_token(
    global: &GlobalOpts,
    profile: Option<&Profile>,
    profile_name: &str,
) -> Option<SecretString> {
    // 1. CLI flag / NCE_TOKEN env (clap merges both)
    if let Some(ref token) = global.token {
        return Some(SecretString::from(token.clone()));
    }

    // 2. Profile's token_env -> env var lookup
    if let Some(env_name) = profile.and_then(|p| p.token_env.as_ref()) {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new("nce-cli", &format!("{profile_name}/token")) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 4. Plaintext in config
    profile
        .and_then(|p| p.token.as_ref())
        .map(|t| SecretString::from(t.clone()))
}

/// Resolve username + password for token issuance.
pub fn resolve_credentials(
    global: &GlobalOpts,
    profile: Option<&Profile>,
    profile_name: &str,
) -> Option<(String, SecretString)> {
    let username = global
        .username
        .clone()
        .or_else(|| profile.and_then(|p| p.username.clone()))?;

    // 1. Env var
    if let Ok(pw) = std::env::var("NCE_PASSWORD") {
        return Some((username, SecretString::from(pw)));
    }

    // 2. Keyring
    if let Ok(entry) = keyring::Entry::new("nce-cli", &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Some((username, SecretString::from(pw)));
        }
    }

    // 3. Plaintext in config
    if let Some(pw) = profile.and_then(|p| p.password.as_ref()) {
        return Some((username, SecretString::from(pw.clone())));
    }

    None
}
