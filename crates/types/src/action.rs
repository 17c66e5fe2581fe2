//! Prompt choices and caller-supplied remediation actions

use futures::future::BoxFuture;
use futures::FutureExt;
use kdiag_errors::ActionError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub type ActionFuture = BoxFuture<'static, Result<(), ActionError>>;

type ActionFn = Arc<dyn Fn() -> ActionFuture + Send + Sync>;

/// Identity of a prompt choice.
///
/// Custom actions are addressed by their position in the report, so a
/// caller label such as "View Logs" can never shadow a built-in action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionId {
    Custom(usize),
    ViewLogs,
    ReportIssue,
    CopyDetails,
}

impl ActionId {
    /// Display label for built-in actions. `None` for custom ones.
    #[must_use]
    pub fn builtin_label(self) -> Option<&'static str> {
        match self {
            Self::Custom(_) => None,
            Self::ViewLogs => Some("View Logs"),
            Self::ReportIssue => Some("Report Issue"),
            Self::CopyDetails => Some("Copy Error Details"),
        }
    }
}

/// One entry offered by a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptChoice {
    pub id: ActionId,
    pub label: String,
}

impl PromptChoice {
    #[must_use]
    pub fn new(id: ActionId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// A remediation step defined by the code that raised the error.
#[derive(Clone)]
pub struct CustomAction {
    label: String,
    run: ActionFn,
}

impl CustomAction {
    #[must_use]
    pub fn new<F, Fut>(label: impl Into<String>, run: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        Self {
            label: label.into(),
            run: Arc::new(move || run().boxed()),
        }
    }

    /// Same callback under a different label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run the callback.
    ///
    /// # Errors
    ///
    /// Returns whatever error the callback produced.
    pub async fn run(&self) -> Result<(), ActionError> {
        (self.run)().await
    }
}

impl fmt::Debug for CustomAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
