#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error handling pipeline for kdiag
//!
//! [`ErrorHandler::handle_error`] is the single entry point every subsystem
//! uses once it has decided an operation failed. For each report it:
//!
//! 1. writes the report to the [`DiagnosticSink`](kdiag_sink::DiagnosticSink)
//! 2. records it in [`ErrorMetrics`](kdiag_metrics::ErrorMetrics)
//! 3. drops the prompt if the same kind and message was seen inside the
//!    throttle window
//! 4. prompts the user with the report's actions plus the built-in ones
//! 5. runs whichever action was picked
//!
//! Steps 1 to 3 never fail. Failures from the prompt or the chosen action
//! are returned to the caller.

pub mod details;
mod handler;
pub mod issue;
pub mod notify;
pub mod ports;
pub mod throttle;

pub use details::{ErrorDetails, ParseDetailsError};
pub use handler::{ErrorHandler, ErrorHandlerBuilder, HandleOutcome};
pub use issue::{EnvironmentInfo, IssueReport};
pub use ports::{Browser, Clipboard, Editor, Notifier};
pub use throttle::Throttle;
