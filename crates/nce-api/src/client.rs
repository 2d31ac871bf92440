// Hand-crafted async HTTP client for the NCE-Campus northbound (tenant view) API.
//
// Auth: X-ACCESS-TOKEN header
// Error body: {errcode, errmsg} with several legacy fallbacks

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;

/// Async client for the NCE-Campus northbound API.
///
/// Holds an immutable base URL and a `reqwest::Client`; the access token, if
/// any, is baked in as a default header at construction. Re-authentication
/// means building a new client value — there is no shared mutable session
/// state.
pub struct NbiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NbiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build an unauthenticated client (token endpoints only).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Build a client that sends `X-ACCESS-TOKEN` on every request.
    pub fn with_token(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut value =
            HeaderValue::from_str(token.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid token header value: {e}"),
            })?;
        value.set_sensitive(true);
        headers.insert("X-ACCESS-TOKEN", value);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Parse and trim the base URL so vendor paths concatenate cleanly.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&path);
        Ok(url)
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append a vendor path (e.g. `/controller/campus/v3/sites`) to the base.
    fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        self.handle_response(resp).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    /// DELETE with an optional JSON body.
    ///
    /// Several NCE collections delete by id-list body rather than by
    /// id-suffixed path, so the body is first-class here.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let mut req = self.http.delete(url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            // Some mutating endpoints answer 2xx with an empty body.
            let effective = if body.trim().is_empty() { "null" } else { &body };
            serde_json::from_str(effective).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: "token rejected or expired".into(),
            };
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(body) = serde_json::from_str::<Value>(&raw) {
            let (code, message) = extract_err_details(&body);
            Error::Api {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| status.to_string()),
                code,
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
            }
        }
    }
}

/// Pull (`errcode`, message) out of a vendor error body.
///
/// The canonical shape is `{errcode, errmsg}`; older endpoints use
/// `message`/`msg`/`description`, a nested `error` object, or an `errors`
/// array. First present wins.
fn extract_err_details(body: &Value) -> (Option<String>, Option<String>) {
    let Some(obj) = body.as_object() else {
        return (None, None);
    };

    let code = obj.get("errcode").map(scalar_to_string);

    let msg_keys = ["errmsg", "message", "msg", "description", "desc"];
    let mut message = msg_keys
        .iter()
        .find_map(|k| obj.get(*k).and_then(message_text));

    if message.is_none() {
        if let Some(err) = obj.get("error").and_then(Value::as_object) {
            message = msg_keys
                .iter()
                .find_map(|k| err.get(*k).and_then(message_text));
        }
    }

    if message.is_none() {
        if let Some(first) = obj
            .get("errors")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .and_then(Value::as_object)
        {
            message = msg_keys
                .iter()
                .find_map(|k| first.get(*k).and_then(message_text));
        }
    }

    (code, message)
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
