//! Bot module - update routing, guarded handler execution and the webhook server.

pub mod context;
pub mod dispatcher;
pub mod error_handler;
pub mod guard;
pub mod router;
mod runtime;
pub mod webhook;

pub use context::{CallbackContext, Context, UpdateContext};
pub use dispatcher::{Dispatched, Dispatcher};
pub use error_handler::{DefaultErrorHandler, ErrorHandler, LoggingErrorHandler};
pub use guard::FailurePolicy;
pub use router::{parse_command, BoxedHandler, ParsedCommand, Router};
pub use runtime::run;
pub use webhook::webhook_router;
