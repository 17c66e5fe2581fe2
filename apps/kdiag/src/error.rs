//! CLI error handling

use std::fmt;

use kdiag_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Pipeline error (configuration, sink, prompt or action)
    Diagnostics(kdiag_errors::Error),
    /// Malformed replay input
    Replay { line: usize, message: String },
    /// I/O error
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Diagnostics(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::Replay { line, message } => {
                write!(f, "Invalid replay record on line {line}: {message}")
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Diagnostics(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Replay { .. } => None,
        }
    }
}

impl From<kdiag_errors::Error> for CliError {
    fn from(e: kdiag_errors::Error) -> Self {
        CliError::Diagnostics(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
