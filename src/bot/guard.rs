//! Isolation and failure policy around handler invocations.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use reqwest::StatusCode;
use tracing::{error, info, warn};

use super::context::UpdateContext;
use super::error_handler::ErrorHandler;
use super::router::BoxedHandler;
use crate::error::{BotError, HandlerResult, FORBIDDEN, TOO_MANY_REQUESTS};

/// What the guard does with a failed handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The user blocked the bot or removed it from the chat. Nothing can
    /// be sent there, so the sink is skipped.
    Blocked,

    /// Flood control. Reporting would only add more requests.
    RateLimited,

    /// Hand the error to the sink.
    Report,
}

impl FailurePolicy {
    pub fn classify(err: &BotError) -> Self {
        if err.is_api_error(FORBIDDEN) {
            Self::Blocked
        } else if err.is_api_error(TOO_MANY_REQUESTS) {
            Self::RateLimited
        } else {
            Self::Report
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run `handler` with `ctx`, converting panics into errors and applying
/// [`FailurePolicy`] to any failure.
///
/// `origin` is what the sink sees when the failure is reported.
pub(crate) async fn run_guarded<C>(
    handler: BoxedHandler<C>,
    ctx: C,
    origin: UpdateContext,
    sink: Arc<dyn ErrorHandler>,
) -> HandlerResult
where
    C: Send + 'static,
{
    let outcome = AssertUnwindSafe(async move { handler(ctx).await })
        .catch_unwind()
        .await;

    let err = match outcome {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(err)) => err,
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            error!("Handler panicked: {}", msg);
            BotError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("handler panicked: {msg}"),
            )
        }
    };

    match FailurePolicy::classify(&err) {
        FailurePolicy::Blocked => {
            warn!(
                "Bot is blocked or was removed (chat: {:?}): {}",
                origin.chat_id(),
                err
            );
        }
        FailurePolicy::RateLimited => {
            info!(
                "Rate limited (chat: {:?}), retry after {}s",
                origin.chat_id(),
                err.retry_after().unwrap_or_default()
            );
        }
        FailurePolicy::Report => {
            let reported = AssertUnwindSafe(sink.handle(&origin, &err))
                .catch_unwind()
                .await;
            if let Err(payload) = reported {
                error!("Error handler panicked: {}", panic_message(payload.as_ref()));
            }
        }
    }

    Err(err)
}
