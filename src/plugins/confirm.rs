//! /confirm plugin.
//!
//! Asks a yes/no question with inline buttons and edits the message once
//! one is pressed.

use tgx::bot::{CallbackContext, Context};
use tgx::error::HandlerResult;
use tgx::types::InlineKeyboardButton;

/// Callback data of the "Yes" button.
pub const CONFIRM: &str = "confirm";

/// Callback data of the "No" button.
pub const CANCEL: &str = "cancel";

/// Handle /confirm.
pub async fn confirm_command(ctx: Context) -> HandlerResult {
    ctx.reply_with_inline_keyboard(
        "Are you sure?",
        vec![vec![
            InlineKeyboardButton::callback("✅ Yes", CONFIRM),
            InlineKeyboardButton::callback("❌ No", CANCEL),
        ]],
    )
    .await?;

    Ok(())
}

pub async fn on_confirm(ctx: CallbackContext) -> HandlerResult {
    ctx.answer("Confirmed").await?;
    ctx.edit_message("✅ Confirmed.").await
}

pub async fn on_cancel(ctx: CallbackContext) -> HandlerResult {
    ctx.answer("Cancelled").await?;
    ctx.edit_message("❌ Cancelled.").await
}
