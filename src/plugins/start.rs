//! /start command plugin.
//!
//! Sends a welcome message. `/start help` (the deep link used by the help
//! button in groups) opens the help menu instead.

use tgx::api::{ParseMode, SendMessageRequest};
use tgx::bot::Context;
use tgx::error::HandlerResult;
use tgx::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::help;

const WELCOME_TEXT: &str = r#"*Hello\!* 👋

I am a demo bot built on *tgx*\.

*Try:*
• /greet _name_
• /ping
• /confirm
• any plain text, I will echo it

Use /help to see all commands\."#;

/// Handle the /start command.
pub async fn start_handler(ctx: Context) -> HandlerResult {
    if ctx.arg(0) == Some("help") {
        return help::send_help_menu(&ctx).await;
    }

    let keyboard = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("📚 Help", help::MAIN),
        InlineKeyboardButton::url("📖 Bot API", "https://core.telegram.org/bots/api"),
    ]]);

    ctx.reply_with(
        SendMessageRequest::new(ctx.chat_id, WELCOME_TEXT)
            .parse_mode(ParseMode::MarkdownV2)
            .reply_markup(keyboard),
    )
    .await?;

    Ok(())
}
