//! Text layout of diagnostic log entries

use crate::level::LogLevel;
use chrono::{DateTime, SecondsFormat, Utc};
use kdiag_types::ErrorReport;
use std::fmt::Write;

pub const SEPARATOR: &str =
    "================================================================================";

/// ISO-8601 timestamp with millisecond precision, e.g. `2024-01-01T12:00:00.000Z`.
#[must_use]
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `[<timestamp>] [<LEVEL>] <message>` plus a trailing newline.
#[must_use]
pub fn format_line(at: DateTime<Utc>, level: LogLevel, message: &str) -> String {
    format!("[{}] [{}] {message}\n", iso_timestamp(at), level.tag())
}

/// Delimited multi-line block for one report. Optional sections appear
/// only when the report carries the field.
#[must_use]
pub fn format_report(at: DateTime<Utc>, report: &ErrorReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{SEPARATOR}");
    let _ = writeln!(out, "ERROR: {}", report.message());
    let _ = writeln!(out, "{SEPARATOR}");
    let _ = writeln!(out, "Timestamp: {}", iso_timestamp(at));
    let _ = writeln!(out, "Kind: {}", report.kind());
    let _ = writeln!(out, "Severity: {}", report.severity());

    if let Some(code) = report.status_code() {
        let _ = writeln!(out, "StatusCode: {code}");
    }
    if let Some(context) = report.context() {
        let json = serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_json());
        let _ = writeln!(out, "Context: {json}");
    }
    if let Some(details) = report.technical_details() {
        let _ = writeln!(out, "TechnicalDetails: {details}");
    }
    if let Some(failure) = report.underlying() {
        let _ = writeln!(out, "Stack: {}", failure.trace());
    }

    let _ = writeln!(out, "{SEPARATOR}");
    out.push('\n');
    out
}
