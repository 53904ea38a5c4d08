use tgx::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub fn get_text() -> &'static str {
    "<b>📚 Help</b>\n\n\
    Pick a category below to see the available commands."
}

pub fn get_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("💬 Commands", super::COMMANDS),
        InlineKeyboardButton::callback("🔘 Buttons", super::BUTTONS),
    ]])
}
