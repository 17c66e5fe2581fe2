//! The error report handed to the diagnostics pipeline

use crate::action::CustomAction;
use crate::context::ErrorContext;
use crate::kind::{ErrorKind, Severity};
use std::error::Error as StdError;
use std::time::Duration;

/// Kind-specific payload of a report. The variant determines the
/// [`ErrorKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    Connection {
        cluster: Option<String>,
    },
    Permission {
        verb: String,
        resource: String,
        namespace: Option<String>,
    },
    NotFound {
        resource_type: String,
        name: String,
        namespace: Option<String>,
    },
    Api {
        status_code: Option<u16>,
    },
    Timeout {
        elapsed: Duration,
    },
    Validation {
        field: Option<String>,
    },
    Unexpected,
}

impl ErrorDetail {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Permission { .. } => ErrorKind::Permission,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Api { .. } => ErrorKind::Api,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Unexpected => ErrorKind::Unexpected,
        }
    }

    /// Transport status implied by the variant.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Permission { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Api { status_code } => *status_code,
            _ => None,
        }
    }
}

/// Snapshot of the failure that caused a report: its message, the
/// `source()` chain and an optional backtrace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnderlyingFailure {
    message: String,
    causes: Vec<String>,
    backtrace: Option<String>,
}

impl UnderlyingFailure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            causes: Vec::new(),
            backtrace: None,
        }
    }

    #[must_use]
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        Self {
            message: err.to_string(),
            causes,
            backtrace: None,
        }
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: impl Into<String>) -> Self {
        self.backtrace = Some(backtrace.into());
        self
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn causes(&self) -> &[String] {
        &self.causes
    }

    /// Multi-line trace: the message, one `Caused by:` line per source, then
    /// the backtrace when captured.
    #[must_use]
    pub fn trace(&self) -> String {
        let mut out = self.message.clone();
        for cause in &self.causes {
            out.push_str("\nCaused by: ");
            out.push_str(cause);
        }
        if let Some(backtrace) = &self.backtrace {
            out.push('\n');
            out.push_str(backtrace.trim_end());
        }
        out
    }
}

/// One classified failure occurrence.
///
/// Built by the domain handlers (or any collaborator) and moved into the
/// error handler, which only ever reads it.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    detail: ErrorDetail,
    severity: Severity,
    message: String,
    technical_details: Option<String>,
    context: ErrorContext,
    underlying: Option<UnderlyingFailure>,
    suggestions: Vec<String>,
    actions: Vec<CustomAction>,
    documentation_url: Option<String>,
}

impl ErrorReport {
    #[must_use]
    pub fn new(detail: ErrorDetail, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            detail,
            severity,
            message: message.into(),
            technical_details: None,
            context: ErrorContext::default(),
            underlying: None,
            suggestions: Vec::new(),
            actions: Vec::new(),
            documentation_url: None,
        }
    }

    #[must_use]
    pub fn with_technical_details(mut self, details: impl Into<String>) -> Self {
        self.technical_details = Some(details.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_underlying(mut self, failure: UnderlyingFailure) -> Self {
        self.underlying = Some(failure);
        self
    }

    #[must_use]
    pub fn with_underlying_error(self, err: &(dyn StdError + 'static)) -> Self {
        self.with_underlying(UnderlyingFailure::from_error(err))
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    #[must_use]
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions.extend(suggestions.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: CustomAction) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn with_actions(mut self, actions: impl IntoIterator<Item = CustomAction>) -> Self {
        self.actions.extend(actions);
        self
    }

    #[must_use]
    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.detail.kind()
    }

    #[must_use]
    pub fn detail(&self) -> &ErrorDetail {
        &self.detail
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.detail.status_code()
    }

    #[must_use]
    pub fn technical_details(&self) -> Option<&str> {
        self.technical_details.as_deref()
    }

    /// The context, or `None` when no key is set.
    #[must_use]
    pub fn context(&self) -> Option<&ErrorContext> {
        if self.context.is_empty() {
            None
        } else {
            Some(&self.context)
        }
    }

    #[must_use]
    pub fn underlying(&self) -> Option<&UnderlyingFailure> {
        self.underlying.as_ref()
    }

    #[must_use]
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    #[must_use]
    pub fn actions(&self) -> &[CustomAction] {
        &self.actions
    }

    #[must_use]
    pub fn documentation_url(&self) -> Option<&str> {
        self.documentation_url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Wrapped {
        inner: std::io::Error,
    }

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("list pods failed")
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.inner)
        }
    }

    #[test]
    fn test_kind_follows_detail() {
        let report = ErrorReport::new(
            ErrorDetail::Permission {
                verb: "get".into(),
                resource: "pods".into(),
                namespace: None,
            },
            Severity::Error,
            "Permission denied: Cannot get pods (cluster-scoped)",
        );
        assert_eq!(report.kind(), ErrorKind::Permission);
        assert_eq!(report.status_code(), Some(403));
        assert!(report.context().is_none());

        let api = ErrorReport::new(ErrorDetail::Api { status_code: None }, Severity::Error, "x");
        assert_eq!(api.status_code(), None);
    }

    #[test]
    fn test_underlying_failure_captures_chain() {
        let err = Wrapped {
            inner: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        let failure = UnderlyingFailure::from_error(&err).with_backtrace("at main\n");
        assert_eq!(failure.message(), "list pods failed");
        assert_eq!(failure.causes(), ["refused".to_string()]);
        assert_eq!(failure.trace(), "list pods failed\nCaused by: refused\nat main");
    }

    #[test]
    fn test_builder_collects_optional_fields() {
        let report = ErrorReport::new(ErrorDetail::Unexpected, Severity::Error, "boom")
            .with_suggestions(["a", "b"])
            .with_suggestion("c")
            .with_technical_details("details")
            .with_documentation_url("https://example.com/docs")
            .with_context(ErrorContext::new().with_cluster("prod"));
        assert_eq!(report.suggestions(), ["a", "b", "c"]);
        assert_eq!(report.technical_details(), Some("details"));
        assert_eq!(report.documentation_url(), Some("https://example.com/docs"));
        assert_eq!(
            report.context().and_then(|c| c.cluster.as_deref()),
            Some("prod")
        );
    }
}
