use tgx::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub fn commands_text() -> &'static str {
    "<b>💬 Commands</b>\n\n\
    /start - welcome message\n\
    /help - this menu\n\
    /greet <i>name</i> - say hello\n\
    /ping - measure API latency\n\
    /confirm - yes/no buttons demo\n\n\
    Anything that is not a command is echoed back."
}

pub fn buttons_text() -> &'static str {
    "<b>🔘 Buttons</b>\n\n\
    Inline buttons send a callback query with their data string. \
    The bot answers the query and edits the message that carried the button."
}

pub fn back_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "⬅️ Back",
        super::MAIN,
    )]])
}
