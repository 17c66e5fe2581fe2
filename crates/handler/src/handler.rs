//! The error handling pipeline

use crate::details::ErrorDetails;
use crate::issue::{EnvironmentInfo, IssueReport};
use crate::notify::{display_message, prompt_choices};
use crate::ports::{Browser, Clipboard, Notifier};
use crate::throttle::Throttle;
use kdiag_config::{Config, LinkConfig, ThrottleConfig};
use kdiag_errors::Error;
use kdiag_metrics::ErrorMetrics;
use kdiag_sink::DiagnosticSink;
use kdiag_types::{ActionId, Clock, ErrorReport, SystemClock};
use std::sync::Arc;
use tracing::{debug, warn};

const COPIED_NOTICE: &str = "Error details copied to clipboard";

/// What `handle_error` did after logging and counting the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Same kind and message inside the throttle window; no prompt shown.
    Suppressed,
    /// Prompt shown and closed without a choice.
    Dismissed,
    /// Prompt shown and the chosen action completed.
    Resolved(ActionId),
}

/// Central error handler shared by every subsystem.
pub struct ErrorHandler {
    sink: Arc<DiagnosticSink>,
    metrics: Arc<ErrorMetrics>,
    throttle: Throttle,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    browser: Arc<dyn Browser>,
    clipboard: Arc<dyn Clipboard>,
    issue_tracker: String,
    environment: EnvironmentInfo,
}

impl ErrorHandler {
    // No public constructor - use ErrorHandlerBuilder instead

    #[must_use]
    pub fn builder() -> ErrorHandlerBuilder {
        ErrorHandlerBuilder::new()
    }

    /// Log, count, throttle, prompt and resolve one report.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown or the chosen action
    /// fails. Logging and counting have already happened by then.
    pub async fn handle_error(&self, report: ErrorReport) -> Result<HandleOutcome, Error> {
        self.sink.write_report(&report);
        self.metrics.record(report.kind());

        if self.throttle.check(&Throttle::key(&report), self.clock.now()) {
            debug!(
                kind = report.kind().as_str(),
                message = report.message(),
                "repeated error suppressed"
            );
            return Ok(HandleOutcome::Suppressed);
        }

        let message = display_message(&report);
        let choices = prompt_choices(&report);
        let Some(choice) = self
            .notifier
            .prompt(report.severity(), &message, &choices)
            .await?
        else {
            return Ok(HandleOutcome::Dismissed);
        };

        debug!(?choice, "action selected");
        self.resolve(choice, &report).await?;
        Ok(HandleOutcome::Resolved(choice))
    }

    async fn resolve(&self, choice: ActionId, report: &ErrorReport) -> Result<(), Error> {
        match choice {
            ActionId::Custom(index) => {
                let action = report.actions().get(index).ok_or_else(|| {
                    Error::internal(format!("prompt returned unknown action #{index}"))
                })?;
                if let Err(e) = action.run().await {
                    warn!(label = action.label(), error = %e, "remediation action failed");
                    return Err(e.into());
                }
            }
            ActionId::ViewLogs => self.sink.reveal(),
            ActionId::ReportIssue => {
                let url = self.issue_url(report);
                self.browser.open_url(&url).await?;
            }
            ActionId::CopyDetails => {
                let details = ErrorDetails::from_report(report, self.clock.now());
                self.clipboard.write_text(&details.render()).await?;
                self.notifier.info(COPIED_NOTICE).await;
            }
        }
        Ok(())
    }

    /// Prefilled "new issue" URL for `report`.
    #[must_use]
    pub fn issue_url(&self, report: &ErrorReport) -> String {
        IssueReport::from_report(report, &self.environment).url(&self.issue_tracker)
    }

    #[must_use]
    pub fn metrics(&self) -> &ErrorMetrics {
        &self.metrics
    }

    #[must_use]
    pub fn sink(&self) -> &DiagnosticSink {
        &self.sink
    }

    /// Number of keys the throttle currently remembers.
    #[must_use]
    pub fn throttle_len(&self) -> usize {
        self.throttle.len()
    }

    /// Close the diagnostic sink. Reports handled afterwards are still
    /// counted and prompted but no longer logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink was already closed or fails to flush.
    pub fn close(&self) -> Result<(), Error> {
        self.sink.close()
    }
}

/// Builder for [`ErrorHandler`]
pub struct ErrorHandlerBuilder {
    sink: Option<Arc<DiagnosticSink>>,
    metrics: Option<Arc<ErrorMetrics>>,
    clock: Option<Arc<dyn Clock>>,
    notifier: Option<Arc<dyn Notifier>>,
    browser: Option<Arc<dyn Browser>>,
    clipboard: Option<Arc<dyn Clipboard>>,
    throttle: ThrottleConfig,
    issue_tracker: String,
    environment: EnvironmentInfo,
}

impl ErrorHandlerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sink: None,
            metrics: None,
            clock: None,
            notifier: None,
            browser: None,
            clipboard: None,
            throttle: ThrottleConfig::default(),
            issue_tracker: LinkConfig::default().issue_tracker,
            environment: EnvironmentInfo::default(),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<DiagnosticSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<ErrorMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn with_browser(mut self, browser: Arc<dyn Browser>) -> Self {
        self.browser = Some(browser);
        self
    }

    #[must_use]
    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    /// Take the throttle window, issue tracker and host version from `config`.
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.throttle = config.throttle.clone();
        self.issue_tracker.clone_from(&config.links.issue_tracker);
        self.environment.host_version.clone_from(&config.environment.host_version);
        self
    }

    #[must_use]
    pub fn with_environment(mut self, environment: EnvironmentInfo) -> Self {
        self.environment = environment;
        self
    }

    /// Build the handler. Clock and metrics default to the system clock and
    /// fresh counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink, notifier, browser or clipboard is
    /// missing.
    pub fn build(self) -> Result<ErrorHandler, Error> {
        let sink = self.sink.ok_or_else(|| Error::missing_component("sink"))?;
        let notifier = self
            .notifier
            .ok_or_else(|| Error::missing_component("notifier"))?;
        let browser = self
            .browser
            .ok_or_else(|| Error::missing_component("browser"))?;
        let clipboard = self
            .clipboard
            .ok_or_else(|| Error::missing_component("clipboard"))?;

        Ok(ErrorHandler {
            sink,
            metrics: self.metrics.unwrap_or_default(),
            throttle: Throttle::from_config(&self.throttle),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            notifier,
            browser,
            clipboard,
            issue_tracker: self.issue_tracker,
            environment: self.environment,
        })
    }
}

impl Default for ErrorHandlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
