//! Plugin system for command handlers.
//!
//! Add new plugins by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_plugin;` below
//! 3. Registering the handler in `register()`

pub mod confirm;
pub mod echo;
pub mod greet;
pub mod help;
pub mod ping;
pub mod start;

use tgx::bot::Dispatcher;

/// Register every plugin on `dispatcher`.
pub fn register(dispatcher: &mut Dispatcher) {
    dispatcher
        .command("start", start::start_handler)
        .command("help", help::help_handler)
        .command("greet", greet::greet_command)
        .command("ping", ping::ping_command)
        .command("confirm", confirm::confirm_command);

    // Help menu navigation
    for data in [help::MAIN, help::COMMANDS, help::BUTTONS] {
        dispatcher.callback(data, help::callback_handler);
    }

    dispatcher
        .callback(confirm::CONFIRM, confirm::on_confirm)
        .callback(confirm::CANCEL, confirm::on_cancel)
        .fallback(echo::echo_handler);
}
