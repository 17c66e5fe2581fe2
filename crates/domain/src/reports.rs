//! Report construction for each failure domain

use crate::api::{ApiFailure, ApiRoute};
use crate::links::LinkActions;
use kdiag_types::{
    CustomAction, ErrorContext, ErrorDetail, ErrorReport, Severity, UnderlyingFailure,
};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::time::Duration;

pub const RETRY: &str = "Retry";
pub const REFRESH: &str = "Refresh";

const CLI_NAME: &str = "kubectl";

/// Callbacks supplied by the code that hit the failure.
#[derive(Debug, Clone, Default)]
pub struct Recovery {
    pub retry: Option<CustomAction>,
    pub refresh: Option<CustomAction>,
}

impl Recovery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_retry(mut self, action: CustomAction) -> Self {
        self.retry = Some(action.with_label(RETRY));
        self
    }

    #[must_use]
    pub fn with_refresh(mut self, action: CustomAction) -> Self {
        self.refresh = Some(action.with_label(REFRESH));
        self
    }
}

#[must_use]
pub fn connection(
    cluster: &str,
    cause: &(dyn StdError + 'static),
    recovery: &Recovery,
    links: &LinkActions,
) -> ErrorReport {
    ErrorReport::new(
        ErrorDetail::Connection {
            cluster: Some(cluster.to_string()),
        },
        Severity::Error,
        format!("Failed to connect to cluster \"{cluster}\""),
    )
    .with_context(ErrorContext::new().with_cluster(cluster))
    .with_technical_details(cause.to_string())
    .with_underlying_error(cause)
    .with_suggestions([
        "Check that the cluster API server is reachable from this machine".to_string(),
        format!(
            "Verify the \"{cluster}\" context in {}",
            links.links().kubeconfig().display()
        ),
        format!("Make sure {CLI_NAME} is installed and on your PATH"),
    ])
    .with_actions(recovery.retry.clone())
    .with_action(links.open_kubeconfig())
    .with_action(links.troubleshooting_guide())
    .with_documentation_url(links.links().troubleshooting.clone())
}

#[must_use]
pub fn cli_not_found(links: &LinkActions) -> ErrorReport {
    ErrorReport::new(
        ErrorDetail::Connection { cluster: None },
        Severity::Error,
        format!("{CLI_NAME} not found"),
    )
    .with_suggestion(format!("Install {CLI_NAME} and make sure it is on your PATH"))
    .with_action(links.installation_guide())
    .with_documentation_url(links.links().install_guide.clone())
}

#[must_use]
pub fn permission(
    verb: &str,
    resource: &str,
    namespace: Option<&str>,
    links: &LinkActions,
) -> ErrorReport {
    let (scope, check) = match namespace {
        Some(ns) => (
            format!("in namespace \"{ns}\""),
            format!("{CLI_NAME} auth can-i {verb} {resource} -n {ns}"),
        ),
        None => (
            "(cluster-scoped)".to_string(),
            format!("{CLI_NAME} auth can-i {verb} {resource}"),
        ),
    };

    let mut context = ErrorContext::new()
        .with_resource_type(resource)
        .with_operation(verb);
    if let Some(ns) = namespace {
        context = context.with_namespace(ns);
    }

    ErrorReport::new(
        ErrorDetail::Permission {
            verb: verb.to_string(),
            resource: resource.to_string(),
            namespace: namespace.map(str::to_string),
        },
        Severity::Error,
        format!("Permission denied: Cannot {verb} {resource} {scope}"),
    )
    .with_context(context)
    .with_suggestions([
        format!("Required permission: {verb} {resource} {scope}"),
        format!("Check your access with: {check}"),
        "Ask a cluster administrator to grant the missing role binding".to_string(),
    ])
    .with_action(links.rbac_documentation())
    .with_documentation_url(links.links().rbac_docs.clone())
}

#[must_use]
pub fn not_found(
    resource_type: &str,
    name: &str,
    namespace: Option<&str>,
    recovery: &Recovery,
) -> ErrorReport {
    let mut context = ErrorContext::new()
        .with_resource_type(resource_type)
        .with_resource_name(name);
    let message = match namespace {
        Some(ns) => {
            context = context.with_namespace(ns);
            format!("{resource_type} \"{name}\" not found in namespace \"{ns}\"")
        }
        None => format!("{resource_type} \"{name}\" not found"),
    };

    ErrorReport::new(
        ErrorDetail::NotFound {
            resource_type: resource_type.to_string(),
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
        },
        Severity::Warning,
        message,
    )
    .with_context(context)
    .with_suggestions([
        "The resource may have been deleted or renamed",
        "Refresh the view to resync with the cluster",
    ])
    .with_actions(recovery.refresh.clone())
}

#[must_use]
pub fn timeout(
    operation: &str,
    elapsed: Duration,
    recovery: &Recovery,
    links: &LinkActions,
) -> ErrorReport {
    ErrorReport::new(
        ErrorDetail::Timeout { elapsed },
        Severity::Warning,
        format!("Operation timed out after {}", format_duration(elapsed)),
    )
    .with_context(ErrorContext::new().with_operation(operation))
    .with_suggestions([
        "Check whether the cluster is under heavy load".to_string(),
        format!("Raise `{}` for slow clusters", links.links().timeout_setting),
    ])
    .with_actions(recovery.retry.clone())
    .with_action(links.increase_timeout())
}

/// Route an API failure by status code. 403 and 404 are reported through
/// the generic branch.
#[must_use]
pub fn api(
    failure: &ApiFailure,
    context: ErrorContext,
    recovery: &Recovery,
    links: &LinkActions,
) -> ErrorReport {
    let code = failure.status_code;
    let detail = ErrorDetail::Api {
        status_code: Some(code),
    };

    let report = match failure.route() {
        ApiRoute::Unauthorized => ErrorReport::new(
            detail,
            Severity::Error,
            format!("Unauthorized: {}", failure.message),
        )
        .with_suggestions([
            "Your credentials may have expired",
            "Re-authenticate or refresh the token in your kubeconfig",
        ])
        .with_action(links.open_kubeconfig()),
        ApiRoute::Conflict => ErrorReport::new(
            detail,
            Severity::Warning,
            format!("Conflict: {}", failure.message),
        )
        .with_suggestion("The resource was modified elsewhere; refresh and try again")
        .with_actions(recovery.refresh.clone()),
        ApiRoute::RateLimit => ErrorReport::new(
            detail,
            Severity::Warning,
            format!(
                "Rate limited by the API server, retry after {} seconds",
                failure.retry_after()
            ),
        )
        .with_suggestion("Reduce the number of concurrent requests"),
        ApiRoute::ServerError => ErrorReport::new(
            detail,
            Severity::Error,
            format!("API server error ({code}): {}", failure.message),
        )
        .with_suggestion("The API server failed to process the request; try again shortly")
        .with_actions(recovery.retry.clone()),
        ApiRoute::Generic => {
            let report = ErrorReport::new(
                detail,
                Severity::Error,
                format!("API error ({code}): {}", failure.message),
            );
            match &failure.body {
                Some(body) if !body.is_empty() => report.with_technical_details(body.clone()),
                _ => report,
            }
        }
    };
    report.with_context(context)
}

#[must_use]
pub fn validation(field: &str, reason: &str) -> ErrorReport {
    ErrorReport::new(
        ErrorDetail::Validation {
            field: Some(field.to_string()),
        },
        Severity::Warning,
        format!("Invalid {field}: {reason}"),
    )
}

/// Wrap a failure nobody classified. A backtrace is attached when capture is
/// enabled through `RUST_BACKTRACE`.
#[must_use]
pub fn unexpected(
    operation: &str,
    err: &(dyn StdError + 'static),
    context: ErrorContext,
) -> ErrorReport {
    let mut failure = UnderlyingFailure::from_error(err);
    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        failure = failure.with_backtrace(backtrace.to_string());
    }

    ErrorReport::new(
        ErrorDetail::Unexpected,
        Severity::Error,
        format!("Unexpected error during {operation}: {err}"),
    )
    .with_context(context.with_operation(operation))
    .with_underlying(failure)
}

/// `<n>ms` under a second, `<n> seconds` under a minute, else `<n> minutes`.
#[must_use]
pub fn format_duration(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1_000 {
        format!("{millis}ms")
    } else if millis < 60_000 {
        format!("{} seconds", elapsed.as_secs())
    } else {
        format!("{} minutes", elapsed.as_secs() / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_tiers() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_millis(1_000)), "1 seconds");
        assert_eq!(format_duration(Duration::from_millis(5_400)), "5 seconds");
        assert_eq!(format_duration(Duration::from_secs(59)), "59 seconds");
        assert_eq!(format_duration(Duration::from_secs(60)), "1 minutes");
        assert_eq!(format_duration(Duration::from_secs(600)), "10 minutes");
    }

    #[test]
    fn test_validation_has_no_actions() {
        let report = validation("replicas", "must be at least 0");
        assert_eq!(report.message(), "Invalid replicas: must be at least 0");
        assert_eq!(report.severity(), Severity::Warning);
        assert!(report.actions().is_empty());
    }

    #[test]
    fn test_not_found_cluster_scoped() {
        let report = not_found("node", "worker-3", None, &Recovery::new());
        assert_eq!(report.message(), "node \"worker-3\" not found");
        assert_eq!(report.status_code(), Some(404));
        assert!(report.actions().is_empty());
    }

    #[test]
    fn test_recovery_relabels_callbacks() {
        let recovery = Recovery::new()
            .with_retry(CustomAction::new("again", || async { Ok(()) }))
            .with_refresh(CustomAction::new("reload", || async { Ok(()) }));
        assert_eq!(recovery.retry.map(|a| a.label().to_string()).as_deref(), Some(RETRY));
        assert_eq!(recovery.refresh.map(|a| a.label().to_string()).as_deref(), Some(REFRESH));
    }
}
