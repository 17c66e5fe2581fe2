//! Errors from user-facing surfaces (prompt, clipboard, browser, editor)

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SurfaceError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("failed to open {url}: {message}")]
    Browser { url: String, message: String },

    #[error("failed to open {path}: {message}")]
    File { path: String, message: String },

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("failed to open settings '{key}': {message}")]
    Settings { key: String, message: String },
}

impl UserFacingError for SurfaceError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Clipboard(_) => {
                Some("No clipboard is available in this session; use View Logs instead.")
            }
            Self::Browser { .. } => Some("Open the link manually in a browser."),
            Self::File { .. } => Some("Open the file manually in an editor."),
            Self::Prompt(_) => None,
            Self::Settings { .. } => Some("Edit the configuration file directly."),
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::Browser { .. } | Self::Clipboard(_))
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::Clipboard(_) => "surface.clipboard",
            Self::Browser { .. } => "surface.browser",
            Self::File { .. } => "surface.file",
            Self::Prompt(_) => "surface.prompt",
            Self::Settings { .. } => "surface.settings",
        })
    }
}
