//! Bot runtime - webhook server lifecycle.

use std::sync::Arc;

use anyhow::Context as _;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::dispatcher::Dispatcher;
use super::webhook::webhook_router;
use crate::api::SetWebhookRequest;
use crate::config::Config;

/// Serve the webhook until Ctrl+C.
///
/// When `WEBHOOK_URL` is configured the URL (and secret token) is
/// registered with `setWebhook` before serving and, if
/// `delete_webhook_on_shutdown` is set, removed again afterwards.
pub async fn run(config: &Config, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let bot = dispatcher.bot().clone();
    let address = config.listen_addr();
    let path = config.webhook_path();

    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("📡 Listening on: {}{}", address, path);

    if let Some(url) = &config.webhook_url {
        info!("🔗 Setting webhook URL: {}", url);
        if config.webhook_secret.is_some() {
            info!("Webhook secret token configured");
        }

        bot.set_webhook_with(&SetWebhookRequest {
            url: url.to_string(),
            secret_token: config.webhook_secret.clone(),
            ..Default::default()
        })
        .await
        .context("Failed to set webhook")?;
        info!("✅ Webhook setup complete, waiting for updates...");
    } else {
        info!("WEBHOOK_URL not set, skipping setWebhook");
    }

    let app = webhook_router(dispatcher, &path, config.webhook_secret.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Webhook server failed")?;

    info!("Shutting down...");

    if config.webhook_url.is_some() && config.delete_webhook_on_shutdown {
        match bot.delete_webhook().await {
            Ok(()) => info!("Webhook deleted"),
            Err(e) => warn!("Failed to delete webhook: {}", e),
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
