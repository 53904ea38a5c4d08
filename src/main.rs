//! tgx demo bot
//!
//! Serves a webhook and wires the plugins in `plugins/`: commands,
//! callback buttons and a fallback echo handler.

mod plugins;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tgx::bot::Dispatcher;
use tgx::{Bot, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tgx=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting tgx bot...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    let bot = Bot::from_config(&config)?;

    // Bot username from config, or ask the API
    let bot_username = match config.bot_username.clone() {
        Some(username) => Some(username),
        None => match bot.get_me().await {
            Ok(me) => me.username,
            Err(e) => {
                warn!("getMe failed, commands addressed to other bots will not be filtered: {}", e);
                None
            }
        },
    };

    let mut dispatcher = Dispatcher::new(bot);
    if let Some(username) = bot_username {
        info!("Using bot username: @{}", username);
        dispatcher = dispatcher.with_username(username);
    }

    plugins::register(&mut dispatcher);
    info!("Registered commands: {:?}", dispatcher.router().command_names());

    tgx::bot::run(&config, Arc::new(dispatcher)).await
}
