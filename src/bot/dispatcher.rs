//! Update dispatcher.
//!
//! Owns the handler registries and the error sink. Handlers are registered
//! on a `&mut Dispatcher` during setup; afterwards it is wrapped in an
//! `Arc` and shared with the webhook endpoint.

use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::context::{CallbackContext, Context, UpdateContext};
use super::error_handler::{DefaultErrorHandler, ErrorHandler};
use super::guard::run_guarded;
use super::router::{boxed, Route, Router};
use crate::api::Bot;
use crate::error::{DispatchError, HandlerResult};
use crate::types::Update;

/// What a successful dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Ran the named command handler.
    Command(String),

    /// Ran the fallback message handler.
    Fallback,

    /// Ran the handler registered for this callback data.
    Callback(String),

    /// Nothing matched and nothing needed to run.
    Ignored,
}

/// Routes updates to handlers.
pub struct Dispatcher {
    bot: Bot,
    router: Router,
    error_handler: RwLock<Arc<dyn ErrorHandler>>,
}

impl Dispatcher {
    /// Create a dispatcher with no handlers and the [`DefaultErrorHandler`].
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            router: Router::new(),
            error_handler: RwLock::new(Arc::new(DefaultErrorHandler)),
        }
    }

    /// Ignore commands addressed to other bots (`/cmd@other_bot`).
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.router.set_bot_username(username);
        self
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Register a handler for `/name`.
    pub fn command<F, Fut>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.router.add_command(name, boxed(handler));
        self
    }

    /// Register a handler for callback queries carrying exactly `data`.
    pub fn callback<F, Fut>(&mut self, data: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(CallbackContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.router.add_callback(data, boxed(handler));
        self
    }

    /// Register the handler for non-empty messages that are not commands.
    pub fn fallback<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.router.set_fallback(boxed(handler));
        self
    }

    /// Replace the error sink. Dispatches already running keep the old one.
    pub fn set_error_handler(&self, handler: impl ErrorHandler + 'static) {
        *self.error_handler.write() = Arc::new(handler);
    }

    fn error_handler(&self) -> Arc<dyn ErrorHandler> {
        self.error_handler.read().clone()
    }

    /// Route one update and run its handler under the guard.
    pub async fn dispatch(&self, update: Update) -> Result<Dispatched, DispatchError> {
        let update_id = update.update_id;
        debug!("Dispatching update {}", update_id);

        match self.router.route(update, &self.bot)? {
            Route::Command { name, handler, ctx } => {
                info!(
                    "Executing /{} (user: {:?}, chat: {})",
                    name, ctx.user_id, ctx.chat_id
                );
                let origin = UpdateContext::Message(ctx.clone());
                run_guarded(handler, ctx, origin, self.error_handler()).await?;
                Ok(Dispatched::Command(name))
            }
            Route::Fallback { handler, ctx } => {
                let origin = UpdateContext::Message(ctx.clone());
                run_guarded(handler, ctx, origin, self.error_handler()).await?;
                Ok(Dispatched::Fallback)
            }
            Route::Callback { handler, ctx } => {
                info!("Executing callback {:?} (user: {})", ctx.data, ctx.user_id);
                let data = ctx.data.clone();
                let origin = UpdateContext::Callback(ctx.clone());
                run_guarded(handler, ctx, origin, self.error_handler()).await?;
                Ok(Dispatched::Callback(data))
            }
            Route::Ignored => Ok(Dispatched::Ignored),
        }
    }

    /// Dispatch `update` on a background task and log the outcome.
    pub fn spawn_dispatch(self: &Arc<Self>, update: Update) -> JoinHandle<()> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            let update_id = update.update_id;
            match dispatcher.dispatch(update).await {
                Ok(outcome) => debug!("Update {} handled: {:?}", update_id, outcome),
                Err(DispatchError::Handler(e)) => {
                    debug!("Update {} handler failed: {}", update_id, e)
                }
                Err(e) => warn!("Update {} rejected ({}): {}", update_id, e.code(), e),
            }
        })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("bot", &self.bot)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    fn text_update(text: &str) -> Update {
        update(json!({
            "update_id": 1,
            "message": {"message_id": 5, "text": text, "chat": {"id": 7}, "from": {"id": 3}}
        }))
    }

    fn offline_bot() -> Bot {
        Bot::new("t").with_api_url("http://127.0.0.1:1")
    }

    #[derive(Default)]
    struct CountingSink {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ErrorHandler for CountingSink {
        async fn handle(&self, _ctx: &UpdateContext, _err: &BotError) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ErrorHandler for Arc<CountingSink> {
        async fn handle(&self, ctx: &UpdateContext, err: &BotError) {
            self.as_ref().handle(ctx, err).await
        }
    }

    #[tokio::test]
    async fn test_greet_receives_arguments() {
        let seen = Arc::new(Mutex::new(None));
        let mut dispatcher = Dispatcher::new(offline_bot());

        let slot = seen.clone();
        dispatcher.command("greet", move |ctx: Context| {
            let slot = slot.clone();
            async move {
                *slot.lock() = Some((ctx.args.clone(), ctx.chat_id, ctx.user_id));
                Ok(())
            }
        });

        let outcome = dispatcher.dispatch(text_update("/greet Alice")).await.unwrap();

        assert_eq!(outcome, Dispatched::Command("greet".to_string()));
        assert_eq!(
            seen.lock().clone(),
            Some((vec!["Alice".to_string()], 7, Some(3)))
        );
    }

    #[tokio::test]
    async fn test_callback_receives_query() {
        let seen = Arc::new(Mutex::new(None));
        let mut dispatcher = Dispatcher::new(offline_bot());

        let slot = seen.clone();
        dispatcher.callback("confirm", move |ctx: CallbackContext| {
            let slot = slot.clone();
            async move {
                *slot.lock() = Some((ctx.query_id.clone(), ctx.chat_id(), ctx.message_id()));
                Ok(())
            }
        });

        let outcome = dispatcher
            .dispatch(update(json!({"callback_query": {
                "id": "q1",
                "data": "confirm",
                "from": {"id": 3},
                "message": {"message_id": 9, "chat": {"id": 7}}
            }})))
            .await
            .unwrap();

        assert_eq!(outcome, Dispatched::Callback("confirm".to_string()));
        assert_eq!(
            seen.lock().clone(),
            Some(("q1".to_string(), Some(7), Some(9)))
        );
    }

    #[tokio::test]
    async fn test_each_command_runs_exactly_once() {
        let names = ["start", "help", "greet", "ping"];
        let counters: Vec<Arc<AtomicUsize>> =
            names.iter().map(|_| Arc::new(AtomicUsize::new(0))).collect();

        let mut dispatcher = Dispatcher::new(offline_bot());
        for (name, counter) in names.iter().zip(&counters) {
            let counter = counter.clone();
            dispatcher.command(*name, move |_ctx: Context| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            });
        }

        for (i, name) in names.iter().enumerate() {
            let text = if i % 2 == 0 {
                format!("/{name}")
            } else {
                format!("/{name} some args")
            };
            dispatcher.dispatch(text_update(&text)).await.unwrap();

            for (j, counter) in counters.iter().enumerate() {
                let expected = usize::from(j <= i);
                assert_eq!(counter.load(Ordering::SeqCst), expected, "after /{name}");
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_command_runs_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new(offline_bot());

        let c = calls.clone();
        dispatcher.command("start", move |_ctx: Context| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let err = dispatcher.dispatch(text_update("/stop")).await.unwrap_err();
        assert!(matches!(err, DispatchError::UnknownCommand(ref n) if n == "stop"));
        assert_eq!(err.code(), 404);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_text_is_an_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new(offline_bot());

        let c = calls.clone();
        dispatcher.command("start", move |_ctx: Context| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let err = dispatcher.dispatch(text_update("")).await.unwrap_err();
        assert!(matches!(err, DispatchError::EmptyMessage));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_text_skips_fallback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new(offline_bot());

        let c = calls.clone();
        dispatcher.fallback(move |_ctx: Context| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let err = dispatcher
            .dispatch(update(json!({"message": {"text": "", "chat": {"id": 7}}})))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::EmptyMessage));
        assert_eq!(err.code(), 400);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    async fn explode(_ctx: Context) -> HandlerResult {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn test_panicking_command_is_reported() {
        let sink = Arc::new(CountingSink::default());
        let mut dispatcher = Dispatcher::new(offline_bot());
        dispatcher.command("boom", explode);
        dispatcher.set_error_handler(sink.clone());

        let err = dispatcher.dispatch(text_update("/boom")).await.unwrap_err();

        match &err {
            DispatchError::Handler(e) => assert_eq!(e.message, "handler panicked: kaboom"),
            other => panic!("expected handler error, got {other:?}"),
        }
        assert_eq!(err.code(), 500);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_gets_plain_text() {
        let seen = Arc::new(Mutex::new(String::new()));
        let mut dispatcher = Dispatcher::new(offline_bot());

        let slot = seen.clone();
        dispatcher.fallback(move |ctx: Context| {
            let slot = slot.clone();
            async move {
                *slot.lock() = ctx.text.clone();
                Ok(())
            }
        });

        let outcome = dispatcher.dispatch(text_update("hello")).await.unwrap();
        assert_eq!(outcome, Dispatched::Fallback);
        assert_eq!(*seen.lock(), "hello");
    }

    #[tokio::test]
    async fn test_failure_reaches_replaced_sink() {
        let sink = Arc::new(CountingSink::default());
        let mut dispatcher = Dispatcher::new(offline_bot());
        dispatcher.command("fail", |_ctx: Context| async {
            Err(BotError::new(StatusCode::INTERNAL_SERVER_ERROR, "boom"))
        });
        dispatcher.set_error_handler(sink.clone());

        let err = dispatcher.dispatch(text_update("/fail")).await.unwrap_err();

        assert!(matches!(err, DispatchError::Handler(_)));
        assert_eq!(err.code(), 500);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_spawn_dispatch_runs_in_background() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new(offline_bot());

        let c = calls.clone();
        dispatcher.command("start", move |_ctx: Context| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let dispatcher = Arc::new(dispatcher);
        dispatcher
            .spawn_dispatch(text_update("/start"))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
