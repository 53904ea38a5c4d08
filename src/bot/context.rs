//! Per-update handler contexts.
//!
//! A context is built once per dispatched update and dropped when the
//! handler returns. It carries the fields of the triggering event plus a
//! [`Bot`] handle for replying.

use reqwest::StatusCode;

use crate::api::{
    AnswerCallbackQueryRequest, Bot, ChatAction, EditMessageTextRequest, SendMessageRequest,
};
use crate::error::BotError;
use crate::types::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Media, Message};

/// Context of a message handler (commands and the fallback handler).
#[derive(Debug, Clone)]
pub struct Context {
    /// Full message text, including the command.
    pub text: String,

    /// Whitespace-separated tokens after the command. Empty for the
    /// fallback handler.
    pub args: Vec<String>,

    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub message_id: i64,
    pub chat_id: i64,

    /// The message itself (media, caption, reply-to, ...).
    pub message: Message,

    bot: Bot,
}

impl Context {
    pub(crate) fn new(message: Message, args: Vec<String>, bot: Bot) -> Self {
        Self {
            text: message.text.clone(),
            args,
            user_id: message.user_id(),
            username: message.username().map(str::to_string),
            message_id: message.message_id,
            chat_id: message.chat.id,
            message,
            bot,
        }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    pub fn media(&self) -> Option<&Media> {
        self.message.media.as_ref()
    }

    pub fn caption(&self) -> Option<&str> {
        self.message.caption.as_deref()
    }

    /// Send `text` to the chat the message came from.
    pub async fn reply(&self, text: impl Into<String>) -> Result<Message, BotError> {
        self.bot.send_message(self.chat_id, text).await
    }

    /// Send a fully specified message to this chat. `req.chat_id` is replaced.
    pub async fn reply_with(&self, mut req: SendMessageRequest) -> Result<Message, BotError> {
        req.chat_id = self.chat_id;
        self.bot.send_message_with(&req).await
    }

    /// Reply quoting the triggering message.
    pub async fn reply_to_message(&self, text: impl Into<String>) -> Result<Message, BotError> {
        self.reply_with(SendMessageRequest::new(self.chat_id, text).reply_to(self.message_id))
            .await
    }

    pub async fn reply_with_inline_keyboard(
        &self,
        text: impl Into<String>,
        buttons: Vec<Vec<InlineKeyboardButton>>,
    ) -> Result<Message, BotError> {
        self.reply_with(
            SendMessageRequest::new(self.chat_id, text)
                .reply_markup(InlineKeyboardMarkup::new(buttons)),
        )
        .await
    }

    pub async fn send_chat_action(&self, action: ChatAction) -> Result<(), BotError> {
        self.bot.send_chat_action(self.chat_id, action).await
    }
}

/// Context of a callback query handler.
#[derive(Debug, Clone)]
pub struct CallbackContext {
    /// Id needed to answer the query.
    pub query_id: String,

    /// Data attached to the pressed button.
    pub data: String,

    /// Message carrying the button; `None` if it was deleted.
    pub message: Option<Message>,

    pub user_id: i64,
    pub username: Option<String>,

    bot: Bot,
}

impl CallbackContext {
    pub(crate) fn new(query: CallbackQuery, bot: Bot) -> Self {
        Self {
            query_id: query.id,
            data: query.data,
            message: query.message,
            user_id: query.from.id,
            username: query.from.username,
            bot,
        }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn chat_id(&self) -> Option<i64> {
        self.message.as_ref().map(|m| m.chat.id)
    }

    pub fn message_id(&self) -> Option<i64> {
        self.message.as_ref().map(|m| m.message_id)
    }

    fn require_message(&self) -> Result<&Message, BotError> {
        self.message.as_ref().ok_or_else(|| {
            BotError::new(
                StatusCode::BAD_REQUEST,
                "Callback query message is no longer available",
            )
        })
    }

    /// Answer the query with a notification at the top of the chat.
    pub async fn answer(&self, text: impl Into<String>) -> Result<(), BotError> {
        self.bot
            .answer_callback_query(&AnswerCallbackQueryRequest {
                callback_query_id: self.query_id.clone(),
                text: Some(text.into()),
                ..Default::default()
            })
            .await
    }

    /// Answer the query with an alert dialog.
    pub async fn answer_alert(&self, text: impl Into<String>) -> Result<(), BotError> {
        self.bot
            .answer_callback_query(&AnswerCallbackQueryRequest {
                callback_query_id: self.query_id.clone(),
                text: Some(text.into()),
                show_alert: Some(true),
                ..Default::default()
            })
            .await
    }

    /// Replace the text of the message carrying the button.
    pub async fn edit_message(&self, text: impl Into<String>) -> Result<(), BotError> {
        let message = self.require_message()?;
        self.bot
            .edit_message_text(&EditMessageTextRequest {
                chat_id: message.chat.id,
                message_id: message.message_id,
                text: text.into(),
                ..Default::default()
            })
            .await
    }

    /// Replace text and keyboard of the message carrying the button.
    pub async fn edit_message_with_keyboard(
        &self,
        text: impl Into<String>,
        markup: InlineKeyboardMarkup,
    ) -> Result<(), BotError> {
        let message = self.require_message()?;
        self.bot
            .edit_message_text(&EditMessageTextRequest {
                chat_id: message.chat.id,
                message_id: message.message_id,
                text: text.into(),
                reply_markup: Some(markup),
                ..Default::default()
            })
            .await
    }

    /// Send a new message to the chat the button lives in.
    pub async fn reply(&self, text: impl Into<String>) -> Result<Message, BotError> {
        let chat_id = self.require_message()?.chat.id;
        self.bot.send_message(chat_id, text).await
    }
}

/// The context a handler ran with, handed to the error handler.
#[derive(Debug, Clone)]
pub enum UpdateContext {
    Message(Context),
    Callback(CallbackContext),
}

impl UpdateContext {
    pub fn bot(&self) -> &Bot {
        match self {
            Self::Message(ctx) => ctx.bot(),
            Self::Callback(ctx) => ctx.bot(),
        }
    }

    /// Chat the update came from; `None` for callbacks on deleted messages.
    pub fn chat_id(&self) -> Option<i64> {
        match self {
            Self::Message(ctx) => Some(ctx.chat_id),
            Self::Callback(ctx) => ctx.chat_id(),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            Self::Message(ctx) => ctx.user_id,
            Self::Callback(ctx) => Some(ctx.user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    fn message(value: serde_json::Value) -> Message {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_context_copies_message_fields() {
        let msg = message(json!({
            "message_id": 5,
            "text": "/greet Alice",
            "chat": {"id": 7},
            "from": {"id": 3, "username": "alice"}
        }));
        let ctx = Context::new(msg, vec!["Alice".to_string()], Bot::new("t"));

        assert_eq!(ctx.text, "/greet Alice");
        assert_eq!(ctx.arg(0), Some("Alice"));
        assert_eq!(ctx.arg(1), None);
        assert_eq!(ctx.chat_id, 7);
        assert_eq!(ctx.user_id, Some(3));
        assert_eq!(ctx.username.as_deref(), Some("alice"));
        assert_eq!(ctx.message_id, 5);
    }

    #[tokio::test]
    async fn test_answer_uses_answer_callback_query() {
        let server = MockServer::start_async().await;
        let answered = server.mock(|when, then| {
            when.method(POST)
                .path("/bott/answerCallbackQuery")
                .json_body(json!({"callback_query_id": "q1", "text": "done"}));
            then.status(200).json_body(json!({"ok": true, "result": true}));
        });

        let query: CallbackQuery = serde_json::from_value(json!({
            "id": "q1",
            "data": "confirm",
            "from": {"id": 3},
            "message": {"chat": {"id": 7}, "message_id": 9}
        }))
        .unwrap();
        let ctx = CallbackContext::new(query, Bot::new("t").with_api_url(server.base_url()));

        ctx.answer("done").await.unwrap();
        answered.assert();
    }

    #[tokio::test]
    async fn test_edit_without_message_fails_locally() {
        let query: CallbackQuery =
            serde_json::from_value(json!({"id": "q1", "data": "x", "from": {"id": 3}})).unwrap();
        let ctx = CallbackContext::new(query, Bot::new("t").with_api_url("http://127.0.0.1:1"));

        assert_eq!(ctx.chat_id(), None);
        let err = ctx.edit_message("new text").await.unwrap_err();
        assert_eq!(err.code, 400);
    }
}
