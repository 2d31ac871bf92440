// Token authentication
//
// The tenant view issues an X-ACCESS-TOKEN via POST /controller/v2/tokens
// and revokes it via DELETE on the same path. The token is carried as a
// default header by a client built with `NbiClient::with_token`.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::NbiClient;
use crate::error::Error;
use crate::types::TokenResponse;

const TOKENS_PATH: &str = "/controller/v2/tokens";

impl NbiClient {
    /// Obtain an access token with username/password.
    ///
    /// `POST /controller/v2/tokens` with `{userName, password}`. The token
    /// arrives under `data.token_id` (some deployments flatten it); either
    /// shape is accepted. Call on an unauthenticated client, then build a
    /// token-bearing client with [`NbiClient::with_token`].
    pub async fn obtain_token(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, Error> {
        debug!("obtaining token for {username}");

        let body = json!({
            "userName": username,
            "password": password.expose_secret(),
        });

        let resp: TokenResponse = self.post(TOKENS_PATH, &body).await.map_err(|e| match e {
            Error::Api { status, message, .. } => Error::Authentication {
                message: format!("token request failed (HTTP {status}): {message}"),
            },
            other => other,
        })?;

        match resp.token() {
            Some(token) => {
                debug!("token obtained");
                Ok(SecretString::from(token.to_owned()))
            }
            None => Err(Error::TokenMissing {
                body: serde_json::to_string(&resp).unwrap_or_default(),
            }),
        }
    }

    /// Revoke an access token.
    ///
    /// `DELETE /controller/v2/tokens` with `{token}` in the body.
    pub async fn revoke_token(&self, token: &SecretString) -> Result<(), Error> {
        debug!("revoking token");

        let body = json!({ "token": token.expose_secret() });
        let _: serde_json::Value = self.delete(TOKENS_PATH, Some(&body)).await?;

        debug!("token revoked");
        Ok(())
    }
}
