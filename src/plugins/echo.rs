//! Fallback plugin: echoes plain text back as a quoted reply.

use tgx::bot::Context;
use tgx::error::HandlerResult;

/// Handle any text message that is not a command.
pub async fn echo_handler(ctx: Context) -> HandlerResult {
    ctx.reply_to_message(echo_text(&ctx.text)).await?;
    Ok(())
}

fn echo_text(text: &str) -> String {
    text.trim().to_string()
}
