//! Token management: obtain and revoke access tokens.

use secrecy::{ExposeSecret, SecretString};

use nce_api::{NbiClient, TlsMode, TransportConfig};

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::config::{self, AuthSource};
use crate::error::CliError;

pub async fn handle(args: AuthArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Login => login(global).await,
        AuthCommand::Logout => logout(global).await,
    }
}

/// Obtain a token and print it on stdout so it can be captured:
/// `export NCE_TOKEN="$(nce auth login)"`.
async fn login(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);
    let profile = cfg.profiles.get(&profile_name);

    let base_uri = global
        .base_uri
        .clone()
        .or_else(|| profile.map(|p| p.base_uri.clone()))
        .ok_or_else(|| CliError::NoConfig {
            path: config::config_path().display().to_string(),
        })?;

    let (username, password) =
        match config::resolve_credentials(global, profile, &profile_name) {
            Some(creds) => creds,
            None => {
                // Username must be known; the password may be prompted.
                let username = global
                    .username
                    .clone()
                    .or_else(|| profile.and_then(|p| p.username.clone()))
                    .ok_or_else(|| CliError::NoCredentials {
                        profile: profile_name.clone(),
                    })?;
                let password = dialoguer::Password::new()
                    .with_prompt(format!("Password for {username}"))
                    .interact()
                    .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
                (username, SecretString::from(password))
            }
        };

    let client = NbiClient::new(&base_uri, &transport(global))?;
    let token = client.obtain_token(&username, &password).await?;

    println!("{}", token.expose_secret());
    if !global.quiet {
        eprintln!("Token obtained; export NCE_TOKEN to use it.");
    }
    Ok(())
}

/// Revoke the resolved token (flag, env, keyring, or profile).
async fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    let settings = config::resolve_settings(global)?;

    let AuthSource::Token(ref token) = settings.auth else {
        return Err(CliError::NoCredentials {
            profile: "current".into(),
        });
    };

    let client = NbiClient::new(&settings.base_uri, &settings.transport())?;
    client.revoke_token(token).await?;

    if !global.quiet {
        eprintln!("Token revoked.");
    }
    Ok(())
}

fn transport(global: &GlobalOpts) -> TransportConfig {
    TransportConfig {
        tls: if global.insecure {
            TlsMode::DangerAcceptInvalid
        } else {
            TlsMode::System
        },
        timeout: std::time::Duration::from_secs(global.timeout),
    }
}
