//! Bug report template for unexpected errors

use kdiag_types::ErrorReport;
use std::fmt::Write;

const TITLE_PREFIX_CHARS: usize = 50;

/// Values for the Environment section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentInfo {
    pub tool_version: String,
    pub host_version: String,
    pub platform: String,
}

impl EnvironmentInfo {
    #[must_use]
    pub fn new(tool_version: impl Into<String>, host_version: impl Into<String>) -> Self {
        Self {
            tool_version: tool_version.into(),
            host_version: host_version.into(),
            platform: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }
}

impl Default for EnvironmentInfo {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"), "terminal")
    }
}

/// Title and markdown body of an issue, ready to become a tracker URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueReport {
    pub title: String,
    pub body: String,
}

impl IssueReport {
    #[must_use]
    pub fn from_report(report: &ErrorReport, environment: &EnvironmentInfo) -> Self {
        Self {
            title: issue_title(report),
            body: issue_body(report, environment),
        }
    }

    /// `<tracker>?title=<enc>&body=<enc>`.
    #[must_use]
    pub fn url(&self, tracker: &str) -> String {
        let separator = if tracker.contains('?') { '&' } else { '?' };
        format!(
            "{tracker}{separator}title={}&body={}",
            urlencoding::encode(&self.title),
            urlencoding::encode(&self.body)
        )
    }
}

#[must_use]
pub fn issue_title(report: &ErrorReport) -> String {
    let prefix: String = report.message().chars().take(TITLE_PREFIX_CHARS).collect();
    format!("[Bug] {}: {prefix}...", report.kind())
}

#[must_use]
pub fn issue_body(report: &ErrorReport, environment: &EnvironmentInfo) -> String {
    let context = report.context();
    let field = |value: Option<String>| value.unwrap_or_else(|| "N/A".to_string());
    let cluster = field(context.and_then(|c| c.cluster.clone()));
    let namespace = field(context.and_then(|c| c.namespace.clone()));
    let resource = field(context.and_then(kdiag_types::ErrorContext::resource));
    let operation = field(context.and_then(|c| c.operation.clone()));
    let stack = report
        .underlying()
        .map_or_else(|| "N/A".to_string(), kdiag_types::UnderlyingFailure::trace);

    let mut body = String::new();
    let _ = writeln!(body, "## Bug Report");
    let _ = writeln!(body);
    let _ = writeln!(body, "**Error Type:** {}", report.kind());
    let _ = writeln!(body, "**Severity:** {}", report.severity());
    let _ = writeln!(body);
    let _ = writeln!(body, "### Description");
    let _ = writeln!(body, "{}", report.message());
    let _ = writeln!(body);
    let _ = writeln!(body, "### Technical Details");
    let _ = writeln!(body, "```");
    let _ = writeln!(body, "{}", report.technical_details().unwrap_or("N/A"));
    let _ = writeln!(body, "```");
    let _ = writeln!(body);
    let _ = writeln!(body, "### Context");
    let _ = writeln!(body, "- Cluster: {cluster}");
    let _ = writeln!(body, "- Namespace: {namespace}");
    let _ = writeln!(body, "- Resource: {resource}");
    let _ = writeln!(body, "- Operation: {operation}");
    let _ = writeln!(body);
    let _ = writeln!(body, "### Environment");
    let _ = writeln!(body, "- Extension Version: {}", environment.tool_version);
    let _ = writeln!(body, "- Host Version: {}", environment.host_version);
    let _ = writeln!(body, "- Platform: {}", environment.platform);
    let _ = writeln!(body);
    let _ = writeln!(body, "### Stack Trace");
    let _ = writeln!(body, "```");
    let _ = writeln!(body, "{stack}");
    let _ = writeln!(body, "```");
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdiag_types::{ErrorContext, ErrorDetail, Severity, UnderlyingFailure};

    fn env() -> EnvironmentInfo {
        EnvironmentInfo {
            tool_version: "0.3.1".into(),
            host_version: "terminal".into(),
            platform: "linux x86_64".into(),
        }
    }

    #[test]
    fn test_title_truncates_by_chars() {
        let message = "é".repeat(60);
        let report = ErrorReport::new(ErrorDetail::Unexpected, Severity::Error, message);
        let title = issue_title(&report);
        assert_eq!(title, format!("[Bug] Unexpected: {}...", "é".repeat(50)));
    }

    #[test]
    fn test_short_message_still_gets_ellipsis() {
        let report = ErrorReport::new(ErrorDetail::Unexpected, Severity::Error, "boom");
        assert_eq!(issue_title(&report), "[Bug] Unexpected: boom...");
    }

    #[test]
    fn test_body_defaults_to_na() {
        let report = ErrorReport::new(ErrorDetail::Unexpected, Severity::Error, "boom");
        let body = issue_body(&report, &env());
        assert!(body.contains("### Technical Details\n```\nN/A\n```"));
        assert!(body.contains("- Cluster: N/A\n- Namespace: N/A\n- Resource: N/A\n- Operation: N/A"));
        assert!(body.contains("### Stack Trace\n```\nN/A\n```"));
        assert!(body.contains("- Platform: linux x86_64"));
    }

    #[test]
    fn test_body_fills_context_and_stack() {
        let report = ErrorReport::new(ErrorDetail::Unexpected, Severity::Error, "boom")
            .with_context(
                ErrorContext::new()
                    .with_cluster("prod")
                    .with_namespace("web")
                    .with_resource_type("pod")
                    .with_resource_name("api-0")
                    .with_operation("delete"),
            )
            .with_technical_details("index out of range")
            .with_underlying(UnderlyingFailure::new("panic in tree refresh"));
        let body = issue_body(&report, &env());
        assert!(body.contains("- Resource: pod/api-0"));
        assert!(body.contains("- Operation: delete"));
        assert!(body.contains("```\nindex out of range\n```"));
        assert!(body.contains("```\npanic in tree refresh\n```"));
    }

    #[test]
    fn test_url_encodes_title_and_body() {
        let issue = IssueReport {
            title: "[Bug] Unexpected: a b...".into(),
            body: "## Bug Report\n".into(),
        };
        assert_eq!(
            issue.url("https://example.com/issues/new"),
            "https://example.com/issues/new?title=%5BBug%5D%20Unexpected%3A%20a%20b...&body=%23%23%20Bug%20Report%0A"
        );
        assert!(issue
            .url("https://example.com/new?labels=bug")
            .starts_with("https://example.com/new?labels=bug&title="));
    }
}
