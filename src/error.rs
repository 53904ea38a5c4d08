//! Error types.
//!
//! Two levels:
//! - [`ApiError`] - a failure reported by the Telegram Bot API itself
//! - [`BotError`] - a transport or internal failure, optionally wrapping the cause
//!
//! A remote failure always arrives wrapped in a `BotError`, so callers test
//! for it with [`BotError::is_api_error`] without unwrapping twice.
//! Routing failures of the dispatcher live in [`DispatchError`].

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Remote error code for "bot was blocked by the user" / "kicked from chat".
pub const FORBIDDEN: i64 = 403;

/// Remote error code for flood control.
pub const TOO_MANY_REQUESTS: i64 = 429;

/// Extra information attached to some API failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResponseParameters {
    /// Seconds to wait before the request may be repeated (flood control).
    #[serde(default)]
    pub retry_after: Option<u64>,

    /// The group has been migrated to a supergroup with this id.
    #[serde(default)]
    pub migrate_to_chat_id: Option<i64>,
}

/// Failure returned by the Telegram Bot API (`"ok": false`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Telegram API error (code: {error_code}): {description}")]
pub struct ApiError {
    pub error_code: i64,
    pub description: String,
    pub parameters: Option<ResponseParameters>,
}

impl ApiError {
    pub fn new(error_code: i64, description: impl Into<String>) -> Self {
        Self {
            error_code,
            description: description.into(),
            parameters: None,
        }
    }

    /// Attach a retry-after hint.
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.parameters
            .get_or_insert_with(ResponseParameters::default)
            .retry_after = Some(seconds);
        self
    }

    pub fn retry_after(&self) -> Option<u64> {
        self.parameters.as_ref().and_then(|p| p.retry_after)
    }
}

/// Underlying cause of a [`BotError`].
#[derive(Debug, Error)]
pub enum BotErrorSource {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Transport or internal failure.
///
/// `code` follows HTTP status semantics (400, 403, 429, 500, 503, ...).
#[derive(Debug, Error)]
#[error("{message}{}", .source.as_ref().map(|s| format!(": {s}")).unwrap_or_default())]
pub struct BotError {
    pub code: u16,
    pub message: String,
    #[source]
    pub source: Option<BotErrorSource>,
}

impl BotError {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_u16(),
            message: message.into(),
            source: None,
        }
    }

    /// Build an error with a wrapped cause.
    pub fn with_source(
        code: StatusCode,
        message: impl Into<String>,
        source: impl Into<BotErrorSource>,
    ) -> Self {
        Self {
            code: code.as_u16(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Wrap a remote failure, choosing the code and message from its error code.
    ///
    /// `http_status` is used for codes without a dedicated mapping.
    pub fn from_api(api: ApiError, http_status: StatusCode) -> Self {
        let (code, message) = match api.error_code {
            429 => (
                StatusCode::TOO_MANY_REQUESTS,
                format!(
                    "Rate limited. Retry after {} seconds",
                    api.retry_after().unwrap_or_default()
                ),
            ),
            400 => (
                StatusCode::BAD_REQUEST,
                "Invalid request to Telegram API".to_string(),
            ),
            401 => (StatusCode::UNAUTHORIZED, "Invalid bot token".to_string()),
            403 => (
                StatusCode::FORBIDDEN,
                "Bot lacks necessary permissions".to_string(),
            ),
            _ => (http_status, "Telegram API error".to_string()),
        };
        Self::with_source(code, message, api)
    }

    /// Wrap an arbitrary handler failure.
    pub fn other(err: impl Into<anyhow::Error>) -> Self {
        Self::with_source(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Handler failed",
            BotErrorSource::Other(err.into()),
        )
    }

    /// The wrapped remote failure, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match &self.source {
            Some(BotErrorSource::Api(api)) => Some(api),
            _ => None,
        }
    }

    /// True when this wraps a remote failure with the given error code.
    pub fn is_api_error(&self, error_code: i64) -> bool {
        self.api_error()
            .is_some_and(|api| api.error_code == error_code)
    }

    /// Flood-control hint in seconds, when the remote sent one.
    pub fn retry_after(&self) -> Option<u64> {
        self.api_error().and_then(ApiError::retry_after)
    }
}

impl From<anyhow::Error> for BotError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err)
    }
}

impl From<ApiError> for BotError {
    fn from(api: ApiError) -> Self {
        Self::from_api(api, StatusCode::BAD_REQUEST)
    }
}

/// Result type returned by handlers.
pub type HandlerResult = Result<(), BotError>;

/// Failure of a single dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Message without text and no fallback handler to take it.
    #[error("Empty message received")]
    EmptyMessage,

    /// Update with neither a message nor a callback query.
    #[error("Update carries no message or callback query")]
    EmptyUpdate,

    /// Text starts with `/` but names no command.
    #[error("Not a valid command: {0:?}")]
    InvalidCommand(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// The handler ran and failed (already passed through the guard policy).
    #[error(transparent)]
    Handler(#[from] BotError),
}

impl DispatchError {
    /// HTTP-style status code of the failure.
    pub fn code(&self) -> u16 {
        match self {
            Self::EmptyMessage | Self::EmptyUpdate | Self::InvalidCommand(_) => {
                StatusCode::BAD_REQUEST.as_u16()
            }
            Self::UnknownCommand(_) => StatusCode::NOT_FOUND.as_u16(),
            Self::Handler(err) => err.code,
        }
    }
}
