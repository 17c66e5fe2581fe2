//! Seams to the user-facing environment
//!
//! The CLI implements these against the terminal; tests use recording fakes.

use async_trait::async_trait;
use kdiag_errors::SurfaceError;
use kdiag_types::{ActionId, PromptChoice, Severity};
use std::path::Path;

/// Shows prompts and transient notices.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Present `message` at the urgency tier of `severity` and wait for the
    /// user to pick one of `choices`. `Ok(None)` means the prompt was
    /// dismissed.
    async fn prompt(
        &self,
        severity: Severity,
        message: &str,
        choices: &[PromptChoice],
    ) -> Result<Option<ActionId>, SurfaceError>;

    /// Informational toast that needs no answer.
    async fn info(&self, message: &str);
}

#[async_trait]
pub trait Browser: Send + Sync {
    async fn open_url(&self, url: &str) -> Result<(), SurfaceError>;
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), SurfaceError>;
}

/// Opens local files and settings for editing.
#[async_trait]
pub trait Editor: Send + Sync {
    async fn open_file(&self, path: &Path) -> Result<(), SurfaceError>;

    async fn open_setting(&self, key: &str) -> Result<(), SurfaceError>;
}
