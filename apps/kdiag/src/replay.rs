//! JSON-lines report input for the `replay` command

use crate::error::CliError;
use kdiag_types::{ErrorContext, ErrorDetail, ErrorKind, ErrorReport, Severity, UnderlyingFailure};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// One line of a replay file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayRecord {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub elapsed_ms: Option<u64>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub context: ErrorContext,
    #[serde(default)]
    pub technical_details: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl ReplayRecord {
    pub fn into_report(self) -> ErrorReport {
        let detail = self.detail();
        let mut report = ErrorReport::new(detail, self.severity, self.message)
            .with_context(self.context)
            .with_suggestions(self.suggestions);
        if let Some(details) = self.technical_details {
            report = report.with_technical_details(details);
        }
        if let Some(stack) = self.stack {
            report = report.with_underlying(UnderlyingFailure::new(stack));
        }
        report
    }

    /// Reject kind-specific fields on records of another kind.
    fn check_kind_fields(&self) -> Result<(), String> {
        let misplaced = [
            ("status_code", self.status_code.is_some(), ErrorKind::Api),
            ("elapsed_ms", self.elapsed_ms.is_some(), ErrorKind::Timeout),
            ("field", self.field.is_some(), ErrorKind::Validation),
        ]
        .into_iter()
        .find(|(_, present, owner)| *present && *owner != self.kind);
        match misplaced {
            Some((name, _, _)) => Err(format!(
                "{name} is not allowed for kind {}",
                self.kind.as_str()
            )),
            None => Ok(()),
        }
    }

    fn detail(&self) -> ErrorDetail {
        let ctx = &self.context;
        match self.kind {
            ErrorKind::Connection => ErrorDetail::Connection {
                cluster: ctx.cluster.clone(),
            },
            ErrorKind::Permission => ErrorDetail::Permission {
                verb: ctx.operation.clone().unwrap_or_default(),
                resource: ctx.resource_type.clone().unwrap_or_default(),
                namespace: ctx.namespace.clone(),
            },
            ErrorKind::NotFound => ErrorDetail::NotFound {
                resource_type: ctx.resource_type.clone().unwrap_or_default(),
                name: ctx.resource_name.clone().unwrap_or_default(),
                namespace: ctx.namespace.clone(),
            },
            ErrorKind::Api => ErrorDetail::Api {
                status_code: self.status_code,
            },
            ErrorKind::Timeout => ErrorDetail::Timeout {
                elapsed: Duration::from_millis(self.elapsed_ms.unwrap_or_default()),
            },
            ErrorKind::Validation => ErrorDetail::Validation {
                field: self.field.clone(),
            },
            ErrorKind::Unexpected => ErrorDetail::Unexpected,
        }
    }
}

/// Parse every non-blank line. Line numbers in errors are 1-based.
pub fn parse_records(contents: &str) -> Result<Vec<ReplayRecord>, CliError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<ReplayRecord>(line)
                .map_err(|e| e.to_string())
                .and_then(|record| record.check_kind_fields().map(|()| record))
                .map_err(|message| CliError::Replay {
                    line: index + 1,
                    message,
                })
        })
        .collect()
}

pub async fn load_records(path: &Path) -> Result<Vec<ReplayRecord>, CliError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| kdiag_errors::Error::io_with_path(&e, path))?;
    parse_records(&contents)
}
