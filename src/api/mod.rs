//! Telegram Bot API transport.
//!
//! [`Bot`] is a cheap-to-clone handle that POSTs a method call to
//! `{api_url}/bot{token}/{method}`, decodes the `{ok, result, ...}` envelope
//! and maps API-level failures to [`BotError`]s.
//!
//! The per-method helpers live in `methods`, the request records in
//! [`requests`].

mod methods;
pub mod params;
pub mod requests;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, BotError, ResponseParameters};

pub use params::ParamBuilder;
pub use requests::*;

/// Default Bot API server.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Default timeout applied to every API request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Handle to the Bot API for one bot token.
///
/// Cloning is cheap and shares the underlying HTTP client.
#[derive(Clone)]
pub struct Bot {
    inner: Arc<BotInner>,
}

#[derive(Clone)]
struct BotInner {
    token: String,
    api_url: String,
    client: Client,
}

/// Generic response envelope of the Bot API.
#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

impl Bot {
    /// Create a bot talking to the public Bot API with the default timeout.
    pub fn new(token: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_client(token, client)
    }

    /// Create a bot with a preconfigured HTTP client.
    pub fn with_client(token: impl Into<String>, client: Client) -> Self {
        Self {
            inner: Arc::new(BotInner {
                token: token.into(),
                api_url: DEFAULT_API_URL.to_string(),
                client,
            }),
        }
    }

    /// Create a bot from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                BotError::with_source(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to build HTTP client",
                    e,
                )
            })?;

        Ok(Self::with_client(config.bot_token.clone(), client).with_api_url(&config.api_url))
    }

    /// Point the bot at another Bot API server (local server, mock).
    pub fn with_api_url(mut self, api_url: impl AsRef<str>) -> Self {
        Arc::make_mut(&mut self.inner).api_url = api_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    pub fn token(&self) -> &str {
        &self.inner.token
    }

    pub fn api_url(&self) -> &str {
        &self.inner.api_url
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.inner.api_url, self.inner.token, method)
    }

    /// Call `method` with JSON-encoded `params` and decode the result.
    pub async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, BotError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_vec(params).map_err(|e| {
            BotError::with_source(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode request parameters",
                e,
            )
        })?;

        debug!("Calling {} ({} bytes)", method, body.len());

        let response = self
            .inner
            .client
            .post(self.method_url(method))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                BotError::with_source(StatusCode::SERVICE_UNAVAILABLE, "Failed to send request", e)
            })?;

        Self::decode_response(response).await
    }

    /// Call `method` and discard the result.
    pub async fn execute<P>(&self, method: &str, params: &P) -> Result<(), BotError>
    where
        P: Serialize + ?Sized,
    {
        self.call::<P, serde_json::Value>(method, params)
            .await
            .map(|_| ())
    }

    /// Upload the file at `path` as `file_field`, with `fields` as the other
    /// form parts.
    pub async fn call_multipart<R>(
        &self,
        method: &str,
        fields: Vec<(String, String)>,
        file_field: &str,
        path: &Path,
    ) -> Result<R, BotError>
    where
        R: DeserializeOwned,
    {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            BotError::with_source(StatusCode::BAD_REQUEST, "Failed to open file", e)
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_field.to_string());

        debug!(
            "Uploading {} ({} bytes) via {}",
            file_name,
            bytes.len(),
            method
        );

        let mut form = Form::new().part(file_field.to_string(), Part::bytes(bytes).file_name(file_name));
        for (key, value) in fields {
            form = form.text(key, value);
        }

        let response = self
            .inner
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                BotError::with_source(StatusCode::SERVICE_UNAVAILABLE, "Failed to send request", e)
            })?;

        Self::decode_response(response).await
    }

    async fn decode_response<R>(response: reqwest::Response) -> Result<R, BotError>
    where
        R: DeserializeOwned,
    {
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            BotError::with_source(
                StatusCode::SERVICE_UNAVAILABLE,
                "Failed to read response body",
                e,
            )
        })?;

        decode_envelope(status, &bytes)
    }
}

/// Decode a raw API response body.
fn decode_envelope<R>(status: StatusCode, body: &[u8]) -> Result<R, BotError>
where
    R: DeserializeOwned,
{
    let envelope: Envelope = serde_json::from_slice(body).map_err(|e| {
        BotError::with_source(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to parse response",
            e,
        )
    })?;

    if !envelope.ok {
        let api = ApiError {
            error_code: envelope.error_code.unwrap_or_else(|| i64::from(status.as_u16())),
            description: envelope.description.unwrap_or_default(),
            parameters: envelope.parameters,
        };
        return Err(BotError::from_api(api, status));
    }

    serde_json::from_value(envelope.result.unwrap_or(serde_json::Value::Null)).map_err(|e| {
        BotError::with_source(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to decode result",
            e,
        )
    })
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("api_url", &self.inner.api_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FORBIDDEN, TOO_MANY_REQUESTS};
    use crate::types::User;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    #[test]
    fn test_decode_ok_envelope() {
        let user: User = decode_envelope(
            StatusCode::OK,
            br#"{"ok":true,"result":{"id":42,"is_bot":true,"first_name":"tgx","username":"tgx_bot"}}"#,
        )
        .unwrap();

        assert_eq!(user.id, 42);
        assert_eq!(user.username.as_deref(), Some("tgx_bot"));
    }

    #[test]
    fn test_decode_rate_limit_envelope() {
        let err = decode_envelope::<bool>(
            StatusCode::TOO_MANY_REQUESTS,
            br#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 5","parameters":{"retry_after":5}}"#,
        )
        .unwrap_err();

        assert_eq!(err.code, 429);
        assert!(err.is_api_error(TOO_MANY_REQUESTS));
        assert_eq!(err.retry_after(), Some(5));
    }

    #[test]
    fn test_decode_garbage_is_parse_failure() {
        let err = decode_envelope::<bool>(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>")
            .unwrap_err();

        assert_eq!(err.code, 500);
        assert_eq!(err.message, "Failed to parse response");
        assert!(err.api_error().is_none());
    }

    #[test]
    fn test_with_api_url_trims_slash() {
        let bot = Bot::new("123:abc").with_api_url("http://localhost:8081/");
        assert_eq!(bot.method_url("getMe"), "http://localhost:8081/bot123:abc/getMe");
    }

    #[tokio::test]
    async fn test_call_posts_json_and_decodes_result() {
        let server = MockServer::start_async().await;
        let sent = server.mock(|when, then| {
            when.method(POST)
                .path("/bottest-token/sendMessage")
                .header("content-type", "application/json")
                .json_body(json!({"chat_id": 7, "text": "hi"}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"ok": true, "result": {"message_id": 1, "chat": {"id": 7}, "text": "hi"}}));
        });

        let bot = Bot::new("test-token").with_api_url(server.base_url());
        let msg: crate::types::Message = bot
            .call("sendMessage", &json!({"chat_id": 7, "text": "hi"}))
            .await
            .unwrap();

        sent.assert();
        assert_eq!(msg.message_id, 1);
    }

    #[tokio::test]
    async fn test_forbidden_response_is_typed() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/bottest-token/sendMessage");
            then.status(403).json_body(json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            }));
        });

        let bot = Bot::new("test-token").with_api_url(server.base_url());
        let err = bot
            .execute("sendMessage", &json!({"chat_id": 7, "text": "hi"}))
            .await
            .unwrap_err();

        assert_eq!(err.code, 403);
        assert!(err.is_api_error(FORBIDDEN));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_service_unavailable() {
        let bot = Bot::new("test-token").with_api_url("http://127.0.0.1:1");
        let err = bot.execute("getMe", &json!({})).await.unwrap_err();

        assert_eq!(err.code, 503);
        assert_eq!(err.message, "Failed to send request");
    }
}
