#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the kdiag diagnostics pipeline
//!
//! These are the failures of the pipeline itself (configuration, the
//! diagnostic sink, remediation actions, user-facing surfaces). The error
//! *taxonomy* that classifies cluster failures lives in `kdiag-types`.

use std::borrow::Cow;

use thiserror::Error;

pub mod action;
pub mod config;
pub mod sink;
pub mod surface;

pub use action::ActionError;
pub use config::ConfigError;
pub use sink::SinkError;
pub use surface::SurfaceError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("diagnostic sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("action error: {0}")]
    Action(#[from] ActionError),

    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("component not configured: {component}")]
    MissingComponent { component: String },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an internal error with a message
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a missing-component error for an incomplete builder
    #[must_use]
    pub fn missing_component(component: impl Into<String>) -> Self {
        Self::MissingComponent {
            component: component.into(),
        }
    }

    /// Create an Io error with an associated path
    #[must_use]
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// Result type alias for kdiag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Action(err) => err.user_message(),
            Error::Surface(err) => err.user_message(),
            Error::Io {
                message,
                path: Some(path),
                ..
            } => Cow::Owned(format!("{}: {message}", path.display())),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_hint(),
            Error::Sink(err) => err.user_hint(),
            Error::Action(err) => err.user_hint(),
            Error::Surface(err) => err.user_hint(),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Action(err) => err.is_retryable(),
            Error::Surface(err) => err.is_retryable(),
            Error::Io { .. } => true,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_code(),
            Error::Sink(err) => err.user_code(),
            Error::Action(err) => err.user_code(),
            Error::Surface(err) => err.user_code(),
            Error::MissingComponent { .. } => Some("error.missing_component"),
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
