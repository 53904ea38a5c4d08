//! /greet command plugin.

use tgx::api::{ParseMode, SendMessageRequest};
use tgx::bot::Context;
use tgx::error::HandlerResult;
use tgx::utils::{format_username, html_escape};

/// Handle `/greet [name...]`. Without a name the sender is greeted.
pub async fn greet_command(ctx: Context) -> HandlerResult {
    let name = if ctx.args.is_empty() {
        match &ctx.message.from {
            Some(user) => format_username(user.username.as_deref(), &user.first_name),
            None => "stranger".to_string(),
        }
    } else {
        ctx.args.join(" ")
    };

    ctx.reply_with(
        SendMessageRequest::new(ctx.chat_id, greeting(&name)).parse_mode(ParseMode::Html),
    )
    .await?;

    Ok(())
}

fn greeting(name: &str) -> String {
    format!("Hello, <b>{}</b>! 👋", html_escape(name))
}
