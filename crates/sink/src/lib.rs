#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Diagnostic sink for kdiag
//!
//! An append-only, human-readable log of every error report, written
//! whether or not the user is ever notified. Each line is kept in memory,
//! optionally appended to a log file, and mirrored to `tracing`.

pub mod format;
pub mod level;
mod sink;

pub use format::{format_line, format_report, iso_timestamp, SEPARATOR};
pub use level::LogLevel;
pub use sink::{DiagnosticSink, NoopReveal, RevealTarget};
