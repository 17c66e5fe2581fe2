//! Diagnostic sink error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SinkError {
    #[error("failed to open diagnostic log {path}: {message}")]
    Open { path: String, message: String },

    #[error("diagnostic sink is closed")]
    Closed,
}

impl UserFacingError for SinkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Open { .. } => Some("Check that the log file directory is writable."),
            Self::Closed => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::Open { .. } => "sink.open",
            Self::Closed => "sink.closed",
        })
    }
}
