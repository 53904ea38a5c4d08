//! tgx - Telegram Bot API client with a webhook dispatcher
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `error` - API, transport and dispatch errors
//! - `types` - Entity model decoded from updates and API results
//! - `api` - `Bot` handle, request records and outbound methods
//! - `bot` - Routing, guarded handler execution, error reporting, webhook server
//! - `utils` - Text helpers
//!
//! ```no_run
//! use std::sync::Arc;
//! use tgx::bot::{Context, Dispatcher};
//! use tgx::{Bot, Config};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let mut dispatcher = Dispatcher::new(Bot::from_config(&config)?);
//! dispatcher.command("hello", |ctx: Context| async move {
//!     ctx.reply("Hello!").await.map(|_| ())
//! });
//! tgx::bot::run(&config, Arc::new(dispatcher)).await
//! # }
//! ```

pub mod api;
pub mod bot;
pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use api::Bot;
pub use bot::{CallbackContext, Context, Dispatcher};
pub use config::Config;
pub use error::{ApiError, BotError, DispatchError, HandlerResult};
