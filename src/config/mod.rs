//! Configuration module for tgx bots.
//!
//! Loads configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::api::{DEFAULT_API_URL, DEFAULT_TIMEOUT};

/// Path the webhook is served on when no `WEBHOOK_URL` is set.
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,

    /// Public URL registered with `setWebhook` on startup.
    /// When unset the server still listens, but no webhook is registered.
    pub webhook_url: Option<Url>,

    /// Port the webhook server listens on.
    pub webhook_port: u16,

    /// Secret expected in the `X-Telegram-Bot-Api-Secret-Token` header.
    pub webhook_secret: Option<String>,

    /// Bot username (without @). Commands addressed to other bots are ignored.
    pub bot_username: Option<String>,

    /// Bot API server base URL.
    pub api_url: String,

    pub request_timeout: Duration,

    /// Call `deleteWebhook` when the server shuts down.
    pub delete_webhook_on_shutdown: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = get("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let webhook_url = get("WEBHOOK_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                    name: "WEBHOOK_URL",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let webhook_port = match get("WEBHOOK_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "WEBHOOK_PORT",
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|e| {
                ConfigError::Invalid {
                    name: "REQUEST_TIMEOUT_SECS",
                    reason: e.to_string(),
                }
            })?),
            None => DEFAULT_TIMEOUT,
        };

        let delete_webhook_on_shutdown = match get("DELETE_WEBHOOK_ON_SHUTDOWN") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "DELETE_WEBHOOK_ON_SHUTDOWN",
                reason: format!("expected true/false, got {:?}", raw),
            })?,
            None => true,
        };

        // Parse bot username (strip @ if present)
        let bot_username = get("BOT_USERNAME")
            .map(|s| s.trim_start_matches('@').to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            bot_token,
            webhook_url,
            webhook_port,
            webhook_secret: get("WEBHOOK_SECRET"),
            bot_username,
            api_url: get("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            request_timeout,
            delete_webhook_on_shutdown,
        })
    }

    /// Route path of the webhook endpoint, taken from `WEBHOOK_URL`.
    pub fn webhook_path(&self) -> String {
        match &self.webhook_url {
            Some(url) if url.path() != "/" => url.path().to_string(),
            _ => DEFAULT_WEBHOOK_PATH.to_string(),
        }
    }

    /// Address the webhook server binds to (all interfaces).
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.webhook_port))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
