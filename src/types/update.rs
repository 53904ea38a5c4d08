//! Incoming updates.

use serde::{Deserialize, Serialize};

use super::message::Message;
use super::user::User;

/// Button press on an inline keyboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    /// Needed to answer the query.
    pub id: String,

    #[serde(default)]
    pub from: User,

    /// Message carrying the button; absent if it was deleted or is too old.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    /// Data the bot attached to the button.
    #[serde(default)]
    pub data: String,
}

/// Inline-mode query (`@bot something`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineQuery {
    pub id: String,

    #[serde(default)]
    pub from: User,

    #[serde(default)]
    pub query: String,

    #[serde(default)]
    pub offset: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<String>,
}

/// One inbound event as delivered to the webhook.
///
/// The platform populates exactly one of the payload fields; [`Update::kind`]
/// picks the first one present if several are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_message: Option<Message>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_query: Option<InlineQuery>,
}

/// Payload of an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    Message(Message),
    CallbackQuery(CallbackQuery),
    EditedMessage(Message),
    InlineQuery(InlineQuery),
    /// No recognized payload.
    Empty,
}

impl Update {
    /// Classify the update, consuming it.
    ///
    /// Priority: message, callback query, edited message, inline query.
    pub fn kind(self) -> UpdateKind {
        if let Some(msg) = self.message {
            UpdateKind::Message(msg)
        } else if let Some(query) = self.callback_query {
            UpdateKind::CallbackQuery(query)
        } else if let Some(msg) = self.edited_message {
            UpdateKind::EditedMessage(msg)
        } else if let Some(query) = self.inline_query {
            UpdateKind::InlineQuery(query)
        } else {
            UpdateKind::Empty
        }
    }

    /// Chat the update belongs to, if any.
    pub fn chat_id(&self) -> Option<i64> {
        self.message
            .as_ref()
            .or(self.edited_message.as_ref())
            .map(|m| m.chat.id)
            .or_else(|| {
                self.callback_query
                    .as_ref()
                    .and_then(|q| q.message.as_ref())
                    .map(|m| m.chat.id)
            })
    }
}
