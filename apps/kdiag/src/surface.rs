//! Terminal implementations of the handler ports

use async_trait::async_trait;
use console::{style, Term};
use kdiag_errors::SurfaceError;
use kdiag_handler::{Browser, Clipboard, Editor, Notifier};
use kdiag_sink::RevealTarget;
use kdiag_types::{ActionId, PromptChoice, Severity};
use std::path::{Path, PathBuf};
use tracing::debug;

const MAX_ATTEMPTS: usize = 3;

/// Numbered-choice prompt on stderr.
pub struct TerminalNotifier {
    term: Term,
    interactive: bool,
    answer: Option<String>,
}

impl TerminalNotifier {
    /// `answer` picks a choice by label without asking. Without it, prompts
    /// are dismissed unless a user is attached to the terminal.
    pub fn new(json_mode: bool, answer: Option<String>) -> Self {
        Self {
            term: Term::stderr(),
            interactive: !json_mode && console::user_attended_stderr(),
            answer,
        }
    }
}

#[async_trait]
impl Notifier for TerminalNotifier {
    async fn prompt(
        &self,
        severity: Severity,
        message: &str,
        choices: &[PromptChoice],
    ) -> Result<Option<ActionId>, SurfaceError> {
        if let Some(label) = &self.answer {
            let picked = choices
                .iter()
                .find(|choice| choice.label.eq_ignore_ascii_case(label))
                .map(|choice| choice.id);
            debug!(label = %label, ?picked, "prompt answered from --answer");
            return Ok(picked);
        }
        if !self.interactive {
            debug!("no user attached, prompt dismissed");
            return Ok(None);
        }

        let term = self.term.clone();
        let header = severity_header(severity);
        let message = message.to_string();
        let choices = choices.to_vec();
        tokio::task::spawn_blocking(move || ask(&term, &header, &message, &choices))
            .await
            .map_err(|e| SurfaceError::Prompt(e.to_string()))?
    }

    async fn info(&self, message: &str) {
        let _ = self
            .term
            .write_line(&format!("{} {message}", style("✓").green()));
    }
}

fn severity_header(severity: Severity) -> String {
    let tag = severity.level_tag();
    match severity {
        Severity::Error => style(tag).red().bold().to_string(),
        Severity::Warning => style(tag).yellow().bold().to_string(),
        Severity::Info => style(tag).cyan().to_string(),
    }
}

fn ask(
    term: &Term,
    header: &str,
    message: &str,
    choices: &[PromptChoice],
) -> Result<Option<ActionId>, SurfaceError> {
    let io_error = |e: std::io::Error| SurfaceError::Prompt(e.to_string());
    term.write_line(&format!("{header} {message}"))
        .map_err(io_error)?;
    for (n, choice) in choices.iter().enumerate() {
        term.write_line(&format!("  [{}] {}", n + 1, choice.label))
            .map_err(io_error)?;
    }

    for _ in 0..MAX_ATTEMPTS {
        term.write_str(&format!("Choose 1-{} (Enter to dismiss): ", choices.len()))
            .map_err(io_error)?;
        let input = term.read_line().map_err(io_error)?;
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        match input.parse::<usize>() {
            Ok(n) if (1..=choices.len()).contains(&n) => return Ok(Some(choices[n - 1].id)),
            _ => term
                .write_line(&format!("{} not a valid choice", style(input).dim()))
                .map_err(io_error)?,
        }
    }
    Ok(None)
}

/// Opens links with the system browser.
pub struct SystemBrowser;

#[async_trait]
impl Browser for SystemBrowser {
    async fn open_url(&self, url: &str) -> Result<(), SurfaceError> {
        debug!(url, "opening browser");
        webbrowser::open(url).map_err(|e| SurfaceError::Browser {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// System clipboard.
pub struct SystemClipboard;

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<(), SurfaceError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| SurfaceError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| SurfaceError::Clipboard(e.to_string()))
    }
}

/// Opens files in `$VISUAL` or `$EDITOR`, or prints where they are.
pub struct TerminalEditor {
    term: Term,
    config_path: Option<PathBuf>,
}

impl TerminalEditor {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            term: Term::stderr(),
            config_path,
        }
    }

    fn editor() -> Option<String> {
        ["VISUAL", "EDITOR"]
            .into_iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
    }
}

#[async_trait]
impl Editor for TerminalEditor {
    async fn open_file(&self, path: &Path) -> Result<(), SurfaceError> {
        let file_error = |message: String| SurfaceError::File {
            path: path.display().to_string(),
            message,
        };
        let Some(editor) = Self::editor() else {
            return self
                .term
                .write_line(&format!("Open {} to edit", style(path.display()).bold()))
                .map_err(|e| file_error(e.to_string()));
        };

        debug!(editor = %editor, path = %path.display(), "launching editor");
        let status = tokio::process::Command::new(&editor)
            .arg(path)
            .status()
            .await
            .map_err(|e| file_error(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(file_error(format!("{editor} exited with {status}")))
        }
    }

    async fn open_setting(&self, key: &str) -> Result<(), SurfaceError> {
        let settings_error = |message: String| SurfaceError::Settings {
            key: key.to_string(),
            message,
        };
        let Some(path) = &self.config_path else {
            return Err(settings_error("no configuration file location".into()));
        };
        self.term
            .write_line(&format!(
                "Set {} in {}",
                style(key).bold(),
                path.display()
            ))
            .map_err(|e| settings_error(e.to_string()))?;
        self.open_file(path)
            .await
            .map_err(|e| settings_error(e.to_string()))
    }
}

/// Prints the diagnostic log to stderr.
pub struct StderrReveal;

impl RevealTarget for StderrReveal {
    fn reveal(&self, contents: &str, path: Option<&Path>) {
        let term = Term::stderr();
        if let Some(path) = path {
            let _ = term.write_line(&format!("Diagnostic log: {}", path.display()));
        }
        let _ = term.write_str(contents);
    }
}
