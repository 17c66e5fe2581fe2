use crate::format::{format_line, format_report};
use crate::level::LogLevel;
use kdiag_config::SinkConfig;
use kdiag_errors::{Error, SinkError};
use kdiag_types::{Clock, ErrorReport, Severity};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

/// Whatever brings the diagnostic log in front of the user.
pub trait RevealTarget: Send + Sync {
    fn reveal(&self, contents: &str, path: Option<&Path>);
}

/// Reveal target that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReveal;

impl RevealTarget for NoopReveal {
    fn reveal(&self, _contents: &str, _path: Option<&Path>) {}
}

struct SinkState {
    buffer: String,
    file: Option<File>,
    closed: bool,
}

/// Append-only diagnostic log.
///
/// Writes never fail outward: a file error is reported through `tracing`
/// and the text is still kept in the in-memory buffer.
pub struct DiagnosticSink {
    state: Mutex<SinkState>,
    path: Option<PathBuf>,
    echo_to_tracing: bool,
    clock: Arc<dyn Clock>,
    reveal: Arc<dyn RevealTarget>,
}

impl DiagnosticSink {
    /// Open the sink, creating the log file (and its directory) when one is
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns `SinkError::Open` if the log file cannot be created.
    pub fn open(config: &SinkConfig, clock: Arc<dyn Clock>) -> Result<Self, Error> {
        let file = match &config.log_file {
            Some(path) => Some(open_log_file(path)?),
            None => None,
        };
        debug!(path = ?config.log_file, "diagnostic sink opened");
        Ok(Self {
            state: Mutex::new(SinkState {
                buffer: String::new(),
                file,
                closed: false,
            }),
            path: config.log_file.clone(),
            echo_to_tracing: config.echo_to_tracing,
            clock,
            reveal: Arc::new(NoopReveal),
        })
    }

    /// Memory-only sink without tracing echo.
    #[must_use]
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(SinkState {
                buffer: String::new(),
                file: None,
                closed: false,
            }),
            path: None,
            echo_to_tracing: false,
            clock,
            reveal: Arc::new(NoopReveal),
        }
    }

    #[must_use]
    pub fn with_reveal_target(mut self, target: Arc<dyn RevealTarget>) -> Self {
        self.reveal = target;
        self
    }

    /// Append one timestamped line.
    pub fn write(&self, message: &str, level: LogLevel) {
        let line = format_line(self.clock.now(), level, message);
        self.append(&line);
        if self.echo_to_tracing {
            match level {
                LogLevel::Debug => debug!(target: "kdiag::diagnostics", "{message}"),
                LogLevel::Info => info!(target: "kdiag::diagnostics", "{message}"),
                LogLevel::Warning => warn!(target: "kdiag::diagnostics", "{message}"),
                LogLevel::Error => error!(target: "kdiag::diagnostics", "{message}"),
            }
        }
    }

    /// Append the delimited block for a report.
    pub fn write_report(&self, report: &ErrorReport) {
        let block = format_report(self.clock.now(), report);
        self.append(&block);
        if self.echo_to_tracing {
            log_report(report);
        }
    }

    /// Show the log to the user.
    pub fn reveal(&self) {
        let contents = self.contents();
        self.reveal.reveal(&contents, self.path.as_deref());
    }

    /// Everything written since the sink was opened.
    #[must_use]
    pub fn contents(&self) -> String {
        self.lock().buffer.clone()
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Flush and release the log file. Later writes are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush to the log file fails.
    pub fn close(&self) -> Result<(), Error> {
        let mut state = self.lock();
        if state.closed {
            return Err(SinkError::Closed.into());
        }
        state.closed = true;
        if let Some(mut file) = state.file.take() {
            file.flush()?;
        }
        debug!("diagnostic sink closed");
        Ok(())
    }

    fn append(&self, text: &str) {
        let mut state = self.lock();
        if state.closed {
            debug!("write to closed diagnostic sink dropped");
            return;
        }
        state.buffer.push_str(text);
        if let Some(file) = state.file.as_mut() {
            if let Err(e) = file.write_all(text.as_bytes()) {
                warn!(path = ?self.path, error = %e, "failed to append to diagnostic log");
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn open_log_file(path: &Path) -> Result<File, Error> {
    let open_error = |e: std::io::Error| SinkError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(open_error)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_error)?;
    Ok(file)
}

fn log_report(report: &ErrorReport) {
    let kind = report.kind().as_str();
    let status_code = report.status_code();
    let message = report.message();
    match report.severity() {
        Severity::Error => error!(
            target: "kdiag::diagnostics",
            kind,
            status_code = ?status_code,
            message = %message,
            "Error reported"
        ),
        Severity::Warning => warn!(
            target: "kdiag::diagnostics",
            kind,
            status_code = ?status_code,
            message = %message,
            "Warning reported"
        ),
        Severity::Info => info!(
            target: "kdiag::diagnostics",
            kind,
            status_code = ?status_code,
            message = %message,
            "Notice reported"
        ),
    }
}
