//! Plain-text error details placed on the clipboard

use chrono::{DateTime, Utc};
use kdiag_sink::iso_timestamp;
use kdiag_types::{ErrorContext, ErrorKind, ErrorReport, ParseTaxonomyError, Severity};
use std::fmt;
use thiserror::Error;

const ERROR_TYPE: &str = "Error Type: ";
const SEVERITY: &str = "Severity: ";
const MESSAGE: &str = "Message: ";
const TIMESTAMP: &str = "\nTimestamp: ";
const STATUS_CODE: &str = "\nStatus Code: ";
const CONTEXT_SECTION: &str = "\n\nContext:\n";
const TECHNICAL_SECTION: &str = "\n\nTechnical Details:\n";
const STACK_SECTION: &str = "\n\nStack Trace:\n";
/// Continuation lines of multi-line values are indented so no value line
/// can be mistaken for a section marker.
const CONTINUATION: &str = "\n  ";

#[derive(Debug, Clone, Error)]
pub enum ParseDetailsError {
    #[error("missing `{0}` line")]
    MissingField(&'static str),

    #[error(transparent)]
    Taxonomy(#[from] ParseTaxonomyError),

    #[error("invalid status code: {0}")]
    InvalidStatusCode(String),

    #[error("invalid context JSON: {0}")]
    InvalidContext(String),

    #[error("unexpected trailing content: {0}")]
    TrailingContent(String),
}

/// Snapshot of a report as copied by "Copy Error Details".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetails {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: String,
    pub timestamp: String,
    pub status_code: Option<u16>,
    pub context: Option<ErrorContext>,
    pub technical_details: Option<String>,
    pub stack_trace: Option<String>,
}

impl ErrorDetails {
    #[must_use]
    pub fn from_report(report: &ErrorReport, at: DateTime<Utc>) -> Self {
        Self {
            kind: report.kind(),
            severity: report.severity(),
            message: report.message().to_string(),
            timestamp: iso_timestamp(at),
            status_code: report.status_code(),
            context: report.context().cloned(),
            technical_details: report.technical_details().map(str::to_string),
            stack_trace: report.underlying().map(kdiag_types::UnderlyingFailure::trace),
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Read back text produced by [`render`](Self::render). Indented
    /// continuation lines are folded back into their value.
    ///
    /// # Errors
    ///
    /// Returns an error if a required line is missing or a value does not
    /// parse.
    pub fn parse(text: &str) -> Result<Self, ParseDetailsError> {
        let rest = text
            .strip_prefix(ERROR_TYPE)
            .ok_or(ParseDetailsError::MissingField("Error Type"))?;
        let (kind, rest) = take_line(rest);
        let rest = rest
            .strip_prefix('\n')
            .and_then(|r| r.strip_prefix(SEVERITY))
            .ok_or(ParseDetailsError::MissingField("Severity"))?;
        let (severity, rest) = take_line(rest);
        let rest = rest
            .strip_prefix('\n')
            .and_then(|r| r.strip_prefix(MESSAGE))
            .ok_or(ParseDetailsError::MissingField("Message"))?;
        // messages may span lines, so they run up to the timestamp
        let (message, rest) = rest
            .split_once(TIMESTAMP)
            .ok_or(ParseDetailsError::MissingField("Timestamp"))?;
        let (timestamp, mut rest) = take_line(rest);

        let mut status_code = None;
        if let Some(after) = rest.strip_prefix(STATUS_CODE) {
            let (code, remainder) = take_line(after);
            status_code = Some(
                code.parse::<u16>()
                    .map_err(|_| ParseDetailsError::InvalidStatusCode(code.to_string()))?,
            );
            rest = remainder;
        }

        let mut context = None;
        if let Some(after) = rest.strip_prefix(CONTEXT_SECTION) {
            let (json, remainder) = split_before(after, &[TECHNICAL_SECTION, STACK_SECTION]);
            context = Some(
                serde_json::from_str::<ErrorContext>(json)
                    .map_err(|e| ParseDetailsError::InvalidContext(e.to_string()))?,
            );
            rest = remainder;
        }

        let mut technical_details = None;
        if let Some(after) = rest.strip_prefix(TECHNICAL_SECTION) {
            let (details, remainder) = split_before(after, &[STACK_SECTION]);
            technical_details = Some(unindent(details));
            rest = remainder;
        }

        let mut stack_trace = None;
        if let Some(after) = rest.strip_prefix(STACK_SECTION) {
            stack_trace = Some(unindent(after));
            rest = "";
        }

        if !rest.is_empty() {
            return Err(ParseDetailsError::TrailingContent(rest.to_string()));
        }

        Ok(Self {
            kind: kind.parse()?,
            severity: severity.parse()?,
            message: unindent(message),
            timestamp: timestamp.to_string(),
            status_code,
            context,
            technical_details,
            stack_trace,
        })
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ERROR_TYPE}{}", self.kind)?;
        write!(f, "\n{SEVERITY}{}", self.severity)?;
        write!(f, "\n{MESSAGE}{}", indent(&self.message))?;
        write!(f, "{TIMESTAMP}{}", self.timestamp)?;
        if let Some(code) = self.status_code {
            write!(f, "{STATUS_CODE}{code}")?;
        }
        if let Some(context) = &self.context {
            let json =
                serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_json());
            write!(f, "{CONTEXT_SECTION}{json}")?;
        }
        if let Some(details) = &self.technical_details {
            write!(f, "{TECHNICAL_SECTION}{}", indent(details))?;
        }
        if let Some(stack) = &self.stack_trace {
            write!(f, "{STACK_SECTION}{}", indent(stack))?;
        }
        Ok(())
    }
}

fn indent(value: &str) -> String {
    value.replace('\n', CONTINUATION)
}

fn unindent(value: &str) -> String {
    value.replace(CONTINUATION, "\n")
}

/// Split at the first newline, keeping it at the front of the remainder.
fn take_line(s: &str) -> (&str, &str) {
    match s.find('\n') {
        Some(i) => s.split_at(i),
        None => (s, ""),
    }
}

/// Split at the earliest of `markers`, or return everything.
fn split_before<'a>(s: &'a str, markers: &[&str]) -> (&'a str, &'a str) {
    markers
        .iter()
        .filter_map(|marker| s.find(marker))
        .min()
        .map_or((s, ""), |i| s.split_at(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kdiag_types::{ErrorDetail, UnderlyingFailure};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 9, 15, 30).unwrap()
    }

    #[test]
    fn test_minimal_payload() {
        let report = ErrorReport::new(
            ErrorDetail::Validation { field: None },
            Severity::Warning,
            "Replica count must be positive",
        );
        let text = ErrorDetails::from_report(&report, at()).render();
        assert_eq!(
            text,
            "Error Type: Validation\nSeverity: warning\nMessage: Replica count must be positive\nTimestamp: 2024-05-02T09:15:30.000Z"
        );
    }

    #[test]
    fn test_full_payload_layout() {
        let report = ErrorReport::new(
            ErrorDetail::NotFound {
                resource_type: "pod".into(),
                name: "api-0".into(),
                namespace: Some("web".into()),
            },
            Severity::Error,
            "Pod \"api-0\" not found",
        )
        .with_context(ErrorContext::new().with_namespace("web"))
        .with_technical_details("GET /api/v1/namespaces/web/pods/api-0")
        .with_underlying(UnderlyingFailure::new("404 Not Found"));
        let text = ErrorDetails::from_report(&report, at()).render();
        assert!(text.contains("\nStatus Code: 404\n\nContext:\n{\n  \"namespace\": \"web\"\n}"));
        assert!(text.contains("\n\nTechnical Details:\nGET /api/v1/namespaces/web/pods/api-0"));
        assert!(text.ends_with("\n\nStack Trace:\n404 Not Found"));
    }

    #[test]
    fn test_parse_recovers_every_field() {
        let report = ErrorReport::new(ErrorDetail::Unexpected, Severity::Error, "first line\nsecond line")
            .with_context(
                ErrorContext::new()
                    .with_cluster("prod")
                    .with_resource_type("deployment")
                    .with_label("attempt", "3"),
            )
            .with_technical_details("details\n\nwith a blank line")
            .with_underlying(UnderlyingFailure::new("outer").with_backtrace("frame 0\nframe 1"));
        let details = ErrorDetails::from_report(&report, at());
        let parsed = ErrorDetails::parse(&details.render()).unwrap();
        assert_eq!(parsed, details);
    }

    #[test]
    fn test_marker_text_inside_values_survives() {
        let report = ErrorReport::new(
            ErrorDetail::Unexpected,
            Severity::Error,
            "rollout stalled\nTimestamp: 12:00",
        )
        .with_technical_details("kubectl output:\n\nStack Trace:\ngoroutine 1")
        .with_underlying(UnderlyingFailure::new("outer"));
        let details = ErrorDetails::from_report(&report, at());
        let text = details.render();
        assert!(text.contains("Message: rollout stalled\n  Timestamp: 12:00\nTimestamp: "));
        assert!(text.contains("\n\nTechnical Details:\nkubectl output:\n  \n  Stack Trace:\n  goroutine 1"));

        let parsed = ErrorDetails::parse(&text).unwrap();
        assert_eq!(parsed, details);
        assert_eq!(parsed.stack_trace.as_deref(), Some("outer"));
    }

    #[test]
    fn test_indented_value_lines_keep_their_own_indent() {
        let report = ErrorReport::new(ErrorDetail::Unexpected, Severity::Error, "boom")
            .with_technical_details("spec:\n  replicas: 0\n");
        let details = ErrorDetails::from_report(&report, at());
        let parsed = ErrorDetails::parse(&details.render()).unwrap();
        assert_eq!(parsed.technical_details.as_deref(), Some("spec:\n  replicas: 0\n"));
    }

    #[test]
    fn test_parse_without_optional_sections() {
        let report = ErrorReport::new(ErrorDetail::Api { status_code: Some(502) }, Severity::Error, "Bad gateway");
        let details = ErrorDetails::from_report(&report, at());
        let parsed = ErrorDetails::parse(&details.render()).unwrap();
        assert_eq!(parsed.status_code, Some(502));
        assert!(parsed.context.is_none());
        assert!(parsed.technical_details.is_none());
        assert!(parsed.stack_trace.is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            ErrorDetails::parse("hello"),
            Err(ParseDetailsError::MissingField("Error Type"))
        ));
        assert!(matches!(
            ErrorDetails::parse("Error Type: Bogus\nSeverity: error\nMessage: x\nTimestamp: t"),
            Err(ParseDetailsError::Taxonomy(_))
        ));
        assert!(matches!(
            ErrorDetails::parse("Error Type: Api\nSeverity: error\nMessage: x\nTimestamp: t\nStatus Code: abc"),
            Err(ParseDetailsError::InvalidStatusCode(_))
        ));
    }
}
