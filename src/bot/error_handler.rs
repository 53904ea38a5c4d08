//! Error reporting for failed handlers.

use async_trait::async_trait;
use tracing::{error, warn};

use super::context::UpdateContext;
use crate::error::BotError;

/// Text sent to the user by [`DefaultErrorHandler`].
pub const APOLOGY_TEXT: &str = "Sorry, something went wrong. Please try again later.";

/// Receives handler failures that the guard decides to report.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    async fn handle(&self, ctx: &UpdateContext, err: &BotError);
}

/// Logs the failure and apologises in the originating chat.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler;

#[async_trait]
impl ErrorHandler for DefaultErrorHandler {
    async fn handle(&self, ctx: &UpdateContext, err: &BotError) {
        error!(
            "Handler failed (user: {:?}, chat: {:?}): {}",
            ctx.user_id(),
            ctx.chat_id(),
            err
        );

        let Some(chat_id) = ctx.chat_id() else {
            return;
        };

        if let Err(e) = ctx.bot().send_message(chat_id, APOLOGY_TEXT).await {
            warn!("Failed to send error notice to chat {}: {}", chat_id, e);
        }
    }
}

/// Only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorHandler;

#[async_trait]
impl ErrorHandler for LoggingErrorHandler {
    async fn handle(&self, ctx: &UpdateContext, err: &BotError) {
        error!(
            "Handler failed (user: {:?}, chat: {:?}): {}",
            ctx.user_id(),
            ctx.chat_id(),
            err
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Bot;
    use crate::bot::context::Context;
    use crate::types::Message;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use reqwest::StatusCode;
    use serde_json::json;

    fn message_ctx(bot: Bot) -> UpdateContext {
        let message: Message =
            serde_json::from_value(json!({"message_id": 1, "text": "/x", "chat": {"id": 7}}))
                .unwrap();
        UpdateContext::Message(Context::new(message, Vec::new(), bot))
    }

    #[tokio::test]
    async fn test_default_handler_apologises() {
        let server = MockServer::start_async().await;
        let apology = server.mock(|when, then| {
            when.method(POST)
                .path("/bott/sendMessage")
                .json_body(json!({"chat_id": 7, "text": APOLOGY_TEXT}));
            then.status(200)
                .json_body(json!({"ok": true, "result": {"message_id": 2, "chat": {"id": 7}}}));
        });

        let ctx = message_ctx(Bot::new("t").with_api_url(server.base_url()));
        let err = BotError::new(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        DefaultErrorHandler.handle(&ctx, &err).await;

        apology.assert();
    }

    #[tokio::test]
    async fn test_default_handler_swallows_send_failure() {
        let server = MockServer::start_async().await;
        let apology = server.mock(|when, then| {
            when.method(POST).path("/bott/sendMessage");
            then.status(403).json_body(json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            }));
        });

        let ctx = message_ctx(Bot::new("t").with_api_url(server.base_url()));
        let err = BotError::new(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        DefaultErrorHandler.handle(&ctx, &err).await;

        apology.assert_calls(1);
    }

    #[tokio::test]
    async fn test_logging_handler_sends_nothing() {
        let server = MockServer::start_async().await;
        let any = server.mock(|when, then| {
            when.method(POST);
            then.status(200).json_body(json!({"ok": true, "result": true}));
        });

        let ctx = message_ctx(Bot::new("t").with_api_url(server.base_url()));
        let err = BotError::new(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        LoggingErrorHandler.handle(&ctx, &err).await;

        any.assert_calls(0);
    }
}
