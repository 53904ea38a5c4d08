//! Webhook endpoint.
//!
//! Telegram POSTs each update as a JSON body. The endpoint decodes it,
//! hands it to the dispatcher on a background task and answers 200
//! right away, so a slow handler never delays the acknowledgement.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::any;
use axum::Router;
use serde::de::Unexpected;
use serde_json::Value;
use tracing::{debug, warn};

use super::dispatcher::Dispatcher;
use crate::types::Update;

/// Header carrying the secret token registered with `setWebhook`.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
struct WebhookState {
    dispatcher: Arc<Dispatcher>,
    secret: Option<Arc<str>>,
}

/// Build the axum router serving the webhook on `path`.
///
/// With `secret` set, requests without a matching
/// `X-Telegram-Bot-Api-Secret-Token` header are rejected with 401.
pub fn webhook_router(dispatcher: Arc<Dispatcher>, path: &str, secret: Option<String>) -> Router {
    let state = WebhookState {
        dispatcher,
        secret: secret.map(Arc::from),
    };

    Router::new()
        .route(path, any(handle_update))
        .with_state(state)
}

async fn handle_update(
    State(state): State<WebhookState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    if method != Method::POST {
        return (StatusCode::METHOD_NOT_ALLOWED, "Only POST requests are allowed");
    }

    if let Some(expected) = state.secret.as_deref() {
        let given = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        let matches = given.is_some_and(|g| timing_safe_equal(g.as_bytes(), expected.as_bytes()));
        if !matches {
            warn!("Rejected webhook request with a missing or wrong secret token");
            return (StatusCode::UNAUTHORIZED, "Invalid secret token");
        }
    }

    let update = match decode_update(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Failed to decode update: {}", e);
            return (StatusCode::BAD_REQUEST, "Failed to decode update");
        }
    };

    debug!("Received update {}", update.update_id);
    state.dispatcher.spawn_dispatch(update);

    (StatusCode::OK, "")
}

/// Decode a webhook body. Only a JSON object is an update.
fn decode_update(body: &[u8]) -> Result<Update, serde_json::Error> {
    match serde_json::from_slice::<Value>(body)? {
        value @ Value::Object(_) => serde_json::from_value(value),
        other => Err(serde::de::Error::invalid_type(
            unexpected(&other),
            &"a JSON object",
        )),
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

fn timing_safe_equal(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut diff = 0u8;
    for (lhs, rhs) in left.iter().zip(right) {
        diff |= lhs ^ rhs;
    }
    diff == 0
}
