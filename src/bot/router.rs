//! Handler registries and update classification.
//!
//! Routing rules, in order:
//! 1. message text starting with `/` → command table (unknown name is an error)
//! 2. message with empty text → `EmptyMessage`
//! 3. any other message → fallback handler, if registered
//! 4. callback query → callback table by exact data (no match is ignored)
//! 5. anything else → `EmptyUpdate`

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use super::context::{CallbackContext, Context};
use crate::api::Bot;
use crate::error::{DispatchError, HandlerResult};
use crate::types::{Update, UpdateKind};

/// Type-erased async handler taking a context of type `C`.
pub type BoxedHandler<C> = Arc<dyn Fn(C) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Box an async closure into a [`BoxedHandler`].
pub fn boxed<C, F, Fut>(handler: F) -> BoxedHandler<C>
where
    C: 'static,
    F: Fn(C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx: C| -> BoxFuture<'static, HandlerResult> { Box::pin(handler(ctx)) })
}

/// A parsed `/command@bot arg1 arg2` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Name without the slash and without the mention.
    pub name: String,

    /// `bot` in `/cmd@bot`, if present.
    pub mention: Option<String>,

    pub args: Vec<String>,
}

/// Split a command line into name, mention and arguments.
///
/// The name runs from the first `/` to the next `/` or `@`. Returns
/// `InvalidCommand` when the name is empty.
pub fn parse_command(text: &str) -> Result<ParsedCommand, DispatchError> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next().unwrap_or_default();

    let Some(body) = head.strip_prefix('/') else {
        return Err(DispatchError::InvalidCommand(head.to_string()));
    };

    let end = body.find(['/', '@']).unwrap_or(body.len());
    let name = &body[..end];
    if name.is_empty() {
        return Err(DispatchError::InvalidCommand(head.to_string()));
    }

    let mention = body[end..]
        .strip_prefix('@')
        .map(|rest| rest.split('/').next().unwrap_or(rest))
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    Ok(ParsedCommand {
        name: name.to_string(),
        mention,
        args: tokens.map(str::to_string).collect(),
    })
}

/// What to run for an update.
pub(crate) enum Route {
    Command {
        name: String,
        handler: BoxedHandler<Context>,
        ctx: Context,
    },
    Fallback {
        handler: BoxedHandler<Context>,
        ctx: Context,
    },
    Callback {
        handler: BoxedHandler<CallbackContext>,
        ctx: CallbackContext,
    },
    Ignored,
}

/// Command, callback and fallback registries.
#[derive(Default)]
pub struct Router {
    commands: HashMap<String, BoxedHandler<Context>>,
    callbacks: HashMap<String, BoxedHandler<CallbackContext>>,
    fallback: Option<BoxedHandler<Context>>,

    /// Commands mentioning another username are ignored.
    bot_username: Option<String>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bot_username(&mut self, username: impl Into<String>) {
        let username = username.into();
        self.bot_username = Some(username.trim_start_matches('@').to_string());
    }

    /// Register a command handler. The name excludes the leading slash.
    pub fn add_command(&mut self, name: impl Into<String>, handler: BoxedHandler<Context>) {
        let name = name.into();
        let name = name.trim_start_matches('/').to_string();
        self.commands.insert(name, handler);
    }

    pub fn add_callback(&mut self, data: impl Into<String>, handler: BoxedHandler<CallbackContext>) {
        self.callbacks.insert(data.into(), handler);
    }

    pub fn set_fallback(&mut self, handler: BoxedHandler<Context>) {
        self.fallback = Some(handler);
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn has_callback(&self, data: &str) -> bool {
        self.callbacks.contains_key(data)
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Registered command names, sorted.
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Classify `update` and pick its handler.
    pub(crate) fn route(&self, update: Update, bot: &Bot) -> Result<Route, DispatchError> {
        match update.kind() {
            UpdateKind::Message(message) => {
                if message.is_command() {
                    let parsed = parse_command(&message.text)?;
                    debug!("Parsed command: {}", parsed.name);
                    if !parsed.args.is_empty() {
                        debug!("Arguments: [{}]", parsed.args.join(", "));
                    }

                    if let (Some(me), Some(mention)) = (&self.bot_username, &parsed.mention) {
                        if !mention.eq_ignore_ascii_case(me) {
                            debug!("Command /{} is addressed to @{}", parsed.name, mention);
                            return Ok(Route::Ignored);
                        }
                    }

                    let handler = self
                        .commands
                        .get(&parsed.name)
                        .cloned()
                        .ok_or_else(|| DispatchError::UnknownCommand(parsed.name.clone()))?;

                    Ok(Route::Command {
                        name: parsed.name,
                        handler,
                        ctx: Context::new(message, parsed.args, bot.clone()),
                    })
                } else if message.text.is_empty() {
                    Err(DispatchError::EmptyMessage)
                } else if let Some(handler) = &self.fallback {
                    Ok(Route::Fallback {
                        handler: handler.clone(),
                        ctx: Context::new(message, Vec::new(), bot.clone()),
                    })
                } else {
                    Ok(Route::Ignored)
                }
            }
            UpdateKind::CallbackQuery(query) => match self.callbacks.get(&query.data) {
                Some(handler) => Ok(Route::Callback {
                    handler: handler.clone(),
                    ctx: CallbackContext::new(query, bot.clone()),
                }),
                None => {
                    debug!("No callback handler for data {:?}", query.data);
                    Ok(Route::Ignored)
                }
            },
            UpdateKind::EditedMessage(_) | UpdateKind::InlineQuery(_) | UpdateKind::Empty => {
                Err(DispatchError::EmptyUpdate)
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("commands", &self.command_names())
            .field("callbacks", &self.callbacks.len())
            .field("fallback", &self.fallback.is_some())
            .field("bot_username", &self.bot_username)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop<C: Send + 'static>() -> BoxedHandler<C> {
        boxed(|_ctx: C| async { Ok(()) })
    }

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    fn text_update(text: &str) -> Update {
        update(json!({"message": {"text": text, "chat": {"id": 7}, "from": {"id": 3}}}))
    }

    #[test]
    fn test_parse_command_with_args() {
        let parsed = parse_command("/greet Alice  Bob").unwrap();
        assert_eq!(parsed.name, "greet");
        assert_eq!(parsed.mention, None);
        assert_eq!(parsed.args, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_parse_command_boundaries() {
        assert_eq!(parse_command("/start@my_bot").unwrap().name, "start");
        assert_eq!(
            parse_command("/start@my_bot").unwrap().mention.as_deref(),
            Some("my_bot")
        );
        assert_eq!(parse_command("/a/b").unwrap().name, "a");
        assert_eq!(parse_command("/a/b").unwrap().mention, None);
        assert_eq!(parse_command("/Help").unwrap().name, "Help");
    }

    #[test]
    fn test_parse_command_without_name() {
        assert!(matches!(parse_command("/"), Err(DispatchError::InvalidCommand(_))));
        assert!(matches!(parse_command("/@bot x"), Err(DispatchError::InvalidCommand(_))));
        assert!(matches!(parse_command("// x"), Err(DispatchError::InvalidCommand(_))));
    }

    #[test]
    fn test_routes_registered_command() {
        let mut router = Router::new();
        router.add_command("greet", noop());

        match router.route(text_update("/greet Alice"), &Bot::new("t")).unwrap() {
            Route::Command { name, ctx, .. } => {
                assert_eq!(name, "greet");
                assert_eq!(ctx.args, vec!["Alice"]);
                assert_eq!(ctx.chat_id, 7);
                assert_eq!(ctx.user_id, Some(3));
            }
            _ => panic!("expected command route"),
        }
    }

    #[test]
    fn test_register_strips_slash_and_last_wins() {
        let mut router = Router::new();
        router.add_command("/start", noop());
        router.add_command("start", noop());

        assert!(router.has_command("start"));
        assert_eq!(router.command_names(), vec!["start"]);
    }

    #[test]
    fn test_unknown_command() {
        let mut router = Router::new();
        router.set_fallback(noop());

        let err = router
            .route(text_update("/nope"), &Bot::new("t"))
            .err()
            .unwrap();
        assert!(matches!(err, DispatchError::UnknownCommand(name) if name == "nope"));
    }

    #[test]
    fn test_command_for_other_bot_is_ignored() {
        let mut router = Router::new();
        router.add_command("start", noop());
        router.set_bot_username("@my_bot");

        let bot = Bot::new("t");
        assert!(matches!(
            router.route(text_update("/start@other_bot"), &bot).unwrap(),
            Route::Ignored
        ));
        assert!(matches!(
            router.route(text_update("/start@My_Bot"), &bot).unwrap(),
            Route::Command { .. }
        ));
    }

    #[test]
    fn test_plain_text_goes_to_fallback_or_is_ignored() {
        let bot = Bot::new("t");
        let mut router = Router::new();
        assert!(matches!(
            router.route(text_update("hello"), &bot).unwrap(),
            Route::Ignored
        ));

        router.set_fallback(noop());
        assert!(matches!(
            router.route(text_update("hello"), &bot).unwrap(),
            Route::Fallback { .. }
        ));
    }

    #[test]
    fn test_empty_text() {
        let bot = Bot::new("t");
        let mut router = Router::new();
        let empty = || update(json!({"message": {"text": "", "chat": {"id": 7}}}));

        assert!(matches!(
            router.route(empty(), &bot).err(),
            Some(DispatchError::EmptyMessage)
        ));

        // A fallback does not take empty messages.
        router.set_fallback(noop());
        assert!(matches!(
            router.route(empty(), &bot).err(),
            Some(DispatchError::EmptyMessage)
        ));
    }

    #[test]
    fn test_callback_routing() {
        let bot = Bot::new("t");
        let mut router = Router::new();
        router.add_callback("confirm", noop());

        let query = |data: &str| {
            update(json!({"callback_query": {
                "id": "q1",
                "data": data,
                "from": {"id": 3},
                "message": {"chat": {"id": 7}, "message_id": 9}
            }}))
        };

        match router.route(query("confirm"), &bot).unwrap() {
            Route::Callback { ctx, .. } => {
                assert_eq!(ctx.query_id, "q1");
                assert_eq!(ctx.chat_id(), Some(7));
                assert_eq!(ctx.message_id(), Some(9));
            }
            _ => panic!("expected callback route"),
        }

        assert!(matches!(
            router.route(query("stale"), &bot).unwrap(),
            Route::Ignored
        ));
    }

    #[test]
    fn test_other_updates_are_empty() {
        let bot = Bot::new("t");
        let router = Router::new();

        for value in [
            json!({}),
            json!({"update_id": 1, "edited_message": {"text": "x", "chat": {"id": 1}}}),
            json!({"inline_query": {"id": "1", "from": {"id": 2}, "query": "q"}}),
        ] {
            assert!(matches!(
                router.route(update(value), &bot).err(),
                Some(DispatchError::EmptyUpdate)
            ));
        }
    }
}
