//! Ping command plugin.
//!
//! Measures and displays Telegram API latency.

use std::time::Instant;

use tgx::api::{ParseMode, SendMessageRequest};
use tgx::bot::Context;
use tgx::error::HandlerResult;

/// Handle the /ping command - measures Telegram API latency.
pub async fn ping_command(ctx: Context) -> HandlerResult {
    // Measure time to call getMe (lightweight API call)
    let start = Instant::now();
    ctx.bot().get_me().await?;
    let ms = start.elapsed().as_millis();

    let text = format!("{} Pong! <code>{}ms</code>", latency_emoji(ms), ms);

    ctx.reply_with(
        SendMessageRequest::new(ctx.chat_id, text)
            .parse_mode(ParseMode::Html)
            .reply_to(ctx.message_id),
    )
    .await?;

    Ok(())
}

fn latency_emoji(ms: u128) -> &'static str {
    if ms < 100 {
        "🟢"
    } else if ms < 300 {
        "🟡"
    } else {
        "🔴"
    }
}
