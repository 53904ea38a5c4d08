//! Reply markup: inline keyboards, reply keyboards and related types.

use serde::{Deserialize, Serialize};

/// A button of an inline keyboard.
///
/// Exactly one of `url` / `callback_data` should be set; use the
/// constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,

    /// `http(s)://` or `tg://` URL opened when the button is pressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Data sent back in a callback query, 1-64 bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

impl InlineKeyboardButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            callback_data: Some(data.into()),
        }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: Some(url.into()),
            callback_data: None,
        }
    }
}

/// Keyboard attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    pub fn new(rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Self {
            inline_keyboard: rows,
        }
    }

    /// Append a row of buttons.
    pub fn append_row(mut self, row: Vec<InlineKeyboardButton>) -> Self {
        self.inline_keyboard.push(row);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardButton {
    pub text: String,
}

impl KeyboardButton {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Custom keyboard replacing the user's keyboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_persistent: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub resize_keyboard: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub one_time_keyboard: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_field_placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub selective: bool,
}

impl ReplyKeyboardMarkup {
    pub fn new(rows: Vec<Vec<KeyboardButton>>) -> Self {
        Self {
            keyboard: rows,
            ..Default::default()
        }
    }

    pub fn resize_keyboard(mut self) -> Self {
        self.resize_keyboard = true;
        self
    }

    pub fn one_time_keyboard(mut self) -> Self {
        self.one_time_keyboard = true;
        self
    }
}

/// Removes the custom keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyKeyboardRemove {
    /// Always `true` on the wire.
    pub remove_keyboard: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub selective: bool,
}

impl Default for ReplyKeyboardRemove {
    fn default() -> Self {
        Self {
            remove_keyboard: true,
            selective: false,
        }
    }
}

/// Forces a reply interface on the user's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceReply {
    /// Always `true` on the wire.
    pub force_reply: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_field_placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub selective: bool,
}

impl Default for ForceReply {
    fn default() -> Self {
        Self {
            force_reply: true,
            input_field_placeholder: None,
            selective: false,
        }
    }
}

/// Any of the markup kinds accepted by `reply_markup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    InlineKeyboard(InlineKeyboardMarkup),
    ReplyKeyboard(ReplyKeyboardMarkup),
    RemoveKeyboard(ReplyKeyboardRemove),
    ForceReply(ForceReply),
}

impl From<InlineKeyboardMarkup> for ReplyMarkup {
    fn from(markup: InlineKeyboardMarkup) -> Self {
        Self::InlineKeyboard(markup)
    }
}

impl From<ReplyKeyboardMarkup> for ReplyMarkup {
    fn from(markup: ReplyKeyboardMarkup) -> Self {
        Self::ReplyKeyboard(markup)
    }
}

impl From<ReplyKeyboardRemove> for ReplyMarkup {
    fn from(markup: ReplyKeyboardRemove) -> Self {
        Self::RemoveKeyboard(markup)
    }
}

impl From<ForceReply> for ReplyMarkup {
    fn from(markup: ForceReply) -> Self {
        Self::ForceReply(markup)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inline_keyboard_wire_format() {
        let markup: ReplyMarkup = InlineKeyboardMarkup::new(vec![vec![
            InlineKeyboardButton::callback("Yes", "confirm"),
            InlineKeyboardButton::url("Docs", "https://core.telegram.org/bots/api"),
        ]])
        .into();

        assert_eq!(
            serde_json::to_value(&markup).unwrap(),
            json!({
                "inline_keyboard": [[
                    {"text": "Yes", "callback_data": "confirm"},
                    {"text": "Docs", "url": "https://core.telegram.org/bots/api"}
                ]]
            })
        );
    }

    #[test]
    fn test_markup_kind_is_recovered_from_wire() {
        let remove: ReplyMarkup = serde_json::from_value(json!({"remove_keyboard": true})).unwrap();
        assert_eq!(remove, ReplyMarkup::RemoveKeyboard(ReplyKeyboardRemove::default()));

        let force: ReplyMarkup =
            serde_json::from_value(json!({"force_reply": true, "input_field_placeholder": "name?"}))
                .unwrap();
        assert!(matches!(force, ReplyMarkup::ForceReply(f) if f.input_field_placeholder.as_deref() == Some("name?")));

        let keyboard: ReplyMarkup =
            serde_json::from_value(json!({"keyboard": [[{"text": "a"}]], "resize_keyboard": true}))
                .unwrap();
        assert_eq!(
            keyboard,
            ReplyMarkup::ReplyKeyboard(
                ReplyKeyboardMarkup::new(vec![vec![KeyboardButton::new("a")]]).resize_keyboard()
            )
        );
    }
}
