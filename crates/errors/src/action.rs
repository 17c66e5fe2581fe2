//! Remediation action error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Failure raised by a remediation action the user picked from a prompt.
#[derive(Debug, Clone, Error)]
pub enum ActionError {
    #[error("action '{label}' failed: {message}")]
    Failed { label: String, message: String },
}

impl ActionError {
    #[must_use]
    pub fn failed(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            label: label.into(),
            message: message.into(),
        }
    }
}

impl UserFacingError for ActionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn is_retryable(&self) -> bool {
        true
    }

    fn user_code(&self) -> Option<&'static str> {
        Some("action.failed")
    }
}
