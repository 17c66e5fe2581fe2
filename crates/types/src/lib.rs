#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Shared error taxonomy for kdiag
//!
//! Every failure in the cluster tooling is classified into one of the
//! [`ErrorKind`]s here before it reaches the diagnostics pipeline. This crate
//! holds the vocabulary only (kind, severity, context, actions and the
//! [`ErrorReport`] record); behaviour lives in the sink, metrics and handler
//! crates.

pub mod action;
pub mod clock;
pub mod context;
pub mod kind;
pub mod report;

pub use action::{ActionFuture, ActionId, CustomAction, PromptChoice};
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::ErrorContext;
pub use kind::{ErrorKind, ParseTaxonomyError, Severity};
pub use report::{ErrorDetail, ErrorReport, UnderlyingFailure};
