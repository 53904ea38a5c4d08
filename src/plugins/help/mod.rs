//! Help command module.
//!
//! Handles /help and the callback queries of the interactive help menu.

use tgx::api::{
    AnswerCallbackQueryRequest, EditMessageTextRequest, ParseMode, SendMessageRequest,
};
use tgx::bot::{CallbackContext, Context};
use tgx::error::HandlerResult;
use tgx::types::InlineKeyboardMarkup;

mod main_help;
mod sections;

/// Callback data of the help menu buttons.
pub const MAIN: &str = "help:main";
pub const COMMANDS: &str = "help:commands";
pub const BUTTONS: &str = "help:buttons";

/// Handle /help command.
pub async fn help_handler(ctx: Context) -> HandlerResult {
    send_help_menu(&ctx).await
}

/// Send the main help menu.
pub async fn send_help_menu(ctx: &Context) -> HandlerResult {
    ctx.reply_with(
        SendMessageRequest::new(ctx.chat_id, main_help::get_text())
            .parse_mode(ParseMode::Html)
            .reply_markup(main_help::get_keyboard()),
    )
    .await?;

    Ok(())
}

/// Handle help callback queries (help:*).
pub async fn callback_handler(ctx: CallbackContext) -> HandlerResult {
    let (text, keyboard) = match ctx.data.as_str() {
        COMMANDS => (sections::commands_text(), sections::back_keyboard()),
        BUTTONS => (sections::buttons_text(), sections::back_keyboard()),
        _ => (main_help::get_text(), main_help::get_keyboard()),
    };

    edit_html(&ctx, text, keyboard).await?;

    ctx.bot()
        .answer_callback_query(&AnswerCallbackQueryRequest {
            callback_query_id: ctx.query_id.clone(),
            ..Default::default()
        })
        .await
}

async fn edit_html(
    ctx: &CallbackContext,
    text: &str,
    keyboard: InlineKeyboardMarkup,
) -> HandlerResult {
    // Message too old or deleted: only answer the query.
    let (Some(chat_id), Some(message_id)) = (ctx.chat_id(), ctx.message_id()) else {
        return Ok(());
    };

    ctx.bot()
        .edit_message_text(&EditMessageTextRequest {
            chat_id,
            message_id,
            text: text.to_string(),
            parse_mode: Some(ParseMode::Html),
            reply_markup: Some(keyboard),
        })
        .await
}
