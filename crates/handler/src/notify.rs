//! Prompt text and the ordered list of choices

use kdiag_types::{ActionId, ErrorKind, ErrorReport, PromptChoice};

/// The report message followed by a parenthesized context fragment, e.g.
/// `Pod not found (Cluster: prod, Namespace: web, Resource: pod/api-0)`.
#[must_use]
pub fn display_message(report: &ErrorReport) -> String {
    let Some(context) = report.context() else {
        return report.message().to_string();
    };

    let mut parts = Vec::new();
    if let Some(cluster) = &context.cluster {
        parts.push(format!("Cluster: {cluster}"));
    }
    if let Some(namespace) = &context.namespace {
        parts.push(format!("Namespace: {namespace}"));
    }
    if let Some(resource) = context.resource() {
        parts.push(format!("Resource: {resource}"));
    }

    if parts.is_empty() {
        report.message().to_string()
    } else {
        format!("{} ({})", report.message(), parts.join(", "))
    }
}

/// Custom actions in report order, then View Logs, then Report Issue for
/// unexpected errors only, then Copy Error Details.
#[must_use]
pub fn prompt_choices(report: &ErrorReport) -> Vec<PromptChoice> {
    let mut choices: Vec<PromptChoice> = report
        .actions()
        .iter()
        .enumerate()
        .map(|(index, action)| PromptChoice::new(ActionId::Custom(index), action.label()))
        .collect();

    let mut builtin = vec![ActionId::ViewLogs];
    if report.kind() == ErrorKind::Unexpected {
        builtin.push(ActionId::ReportIssue);
    }
    builtin.push(ActionId::CopyDetails);

    choices.extend(builtin.into_iter().filter_map(|id| {
        id.builtin_label()
            .map(|label| PromptChoice::new(id, label))
    }));
    choices
}
