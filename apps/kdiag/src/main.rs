//! kdiag - Error diagnostics and remediation for Kubernetes tooling
//!
//! Drives the diagnostics pipeline from the terminal: simulated failures per
//! domain, or a replay of recorded reports.

mod cli;
mod display;
mod error;
mod replay;
mod surface;

use crate::cli::{Cli, Commands, SimulateCommands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::surface::{
    StderrReveal, SystemBrowser, SystemClipboard, TerminalEditor, TerminalNotifier,
};
use clap::Parser;
use kdiag_config::Config;
use kdiag_domain::{ApiFailure, DomainErrorHandlers, Recovery};
use kdiag_errors::ActionError;
use kdiag_handler::{EnvironmentInfo, ErrorHandler, HandleOutcome};
use kdiag_sink::DiagnosticSink;
use kdiag_types::{Clock, CustomAction, ErrorContext, SystemClock};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting kdiag v{}", env!("CARGO_PKG_VERSION"));

    // File config (or defaults), then environment, then CLI flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    if let Some(log_file) = &cli.global.log_file {
        config.sink.log_file = Some(log_file.clone());
    }

    let config_path = cli
        .global
        .config
        .clone()
        .or_else(|| Config::default_path().ok());

    let handlers = build_handlers(&config, &cli, config_path)?;

    let outcomes = execute_command(cli.command, &handlers).await;
    let outcomes = finish(outcomes, handlers.handler().close())?;

    let renderer = OutputRenderer::new(cli.global.json);
    renderer.render_summary(handlers.handler().metrics(), &outcomes)?;

    info!("Command completed successfully");
    Ok(())
}

/// Combine a command result with the result of closing the sink. A command
/// failure is reported ahead of a close failure.
fn finish<T>(
    outcome: Result<T, CliError>,
    closed: Result<(), kdiag_errors::Error>,
) -> Result<T, CliError> {
    let value = outcome?;
    closed?;
    Ok(value)
}

fn build_handlers(
    config: &Config,
    cli: &Cli,
    config_path: Option<PathBuf>,
) -> Result<DomainErrorHandlers, CliError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let browser: Arc<dyn kdiag_handler::Browser> = Arc::new(SystemBrowser);
    let editor = Arc::new(TerminalEditor::new(config_path));
    let notifier = Arc::new(TerminalNotifier::new(
        cli.global.json,
        cli.global.answer.clone(),
    ));

    let sink = DiagnosticSink::open(&config.sink, Arc::clone(&clock))?
        .with_reveal_target(Arc::new(StderrReveal));

    let handler = ErrorHandler::builder()
        .with_config(config)
        .with_clock(clock)
        .with_sink(Arc::new(sink))
        .with_notifier(notifier)
        .with_browser(Arc::clone(&browser))
        .with_clipboard(Arc::new(SystemClipboard))
        .with_environment(EnvironmentInfo::new(
            env!("CARGO_PKG_VERSION"),
            config.environment.host_version.clone(),
        ))
        .build()?;

    Ok(DomainErrorHandlers::new(
        Arc::new(handler),
        browser,
        editor,
        config.links.clone(),
    ))
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    handlers: &DomainErrorHandlers,
) -> Result<Vec<HandleOutcome>, CliError> {
    match command {
        Commands::Simulate { domain } => simulate(domain, handlers).await,
        Commands::Replay { file } => {
            let records = replay::load_records(&file).await?;
            info!(count = records.len(), file = %file.display(), "replaying reports");
            let mut outcomes = Vec::with_capacity(records.len());
            for record in records {
                outcomes.push(handlers.handler().handle_error(record.into_report()).await?);
            }
            Ok(outcomes)
        }
    }
}

async fn simulate(
    domain: SimulateCommands,
    handlers: &DomainErrorHandlers,
) -> Result<Vec<HandleOutcome>, CliError> {
    let outcome = match domain {
        SimulateCommands::Connection { cluster, reason } => {
            let cause = std::io::Error::other(reason);
            let recovery = Recovery::new().with_retry(announce("retrying connection"));
            handlers.connection(&cluster, &cause, &recovery).await?
        }
        SimulateCommands::CliMissing => handlers.cli_not_found().await?,
        SimulateCommands::Permission {
            verb,
            resource,
            namespace,
        } => {
            handlers
                .permission(&verb, &resource, namespace.as_deref())
                .await?
        }
        SimulateCommands::NotFound {
            name,
            resource_type,
            namespace,
        } => {
            let recovery = Recovery::new().with_refresh(announce("refreshing resource tree"));
            handlers
                .not_found(&resource_type, &name, namespace.as_deref(), &recovery)
                .await?
        }
        SimulateCommands::Timeout {
            operation,
            elapsed_ms,
            repeat,
        } => {
            let recovery = Recovery::new().with_retry(announce("retrying operation"));
            let elapsed = Duration::from_millis(elapsed_ms);
            let mut outcomes = Vec::new();
            for _ in 0..repeat {
                outcomes.push(handlers.timeout(&operation, elapsed, &recovery).await?);
            }
            return Ok(outcomes);
        }
        SimulateCommands::Api {
            status,
            message,
            headers,
            body,
        } => {
            let mut failure = ApiFailure::new(status, message);
            for (name, value) in headers {
                failure = failure.with_header(name, value);
            }
            if let Some(body) = body {
                failure = failure.with_body(body);
            }
            let recovery = Recovery::new()
                .with_retry(announce("retrying request"))
                .with_refresh(announce("refreshing resource tree"));
            handlers
                .api(&failure, ErrorContext::default(), &recovery)
                .await?
        }
        SimulateCommands::Validation { field, reason } => {
            handlers.validation(&field, &reason).await?
        }
        SimulateCommands::Unexpected { message, operation } => {
            let err = std::io::Error::other(message);
            handlers
                .unexpected(&operation, &err, ErrorContext::default())
                .await?
        }
    };
    Ok(vec![outcome])
}

/// Recovery callback for simulated failures. Only reports that it ran.
fn announce(what: &'static str) -> CustomAction {
    CustomAction::new(what, move || async move {
        info!(action = what, "recovery action invoked");
        eprintln!("{} {what}", console::style("→").cyan());
        Ok::<(), ActionError>(())
    })
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if json_mode {
        // JSON mode: nothing but the summary on stdout
        if debug_enabled {
            if let Some(file) = create_log_file() {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(debug_filter())
                    .init();
                return;
            }
        }
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else if debug_enabled {
        if let Some(file) = create_log_file() {
            tracing_subscriber::fmt()
                .json()
                .with_writer(file)
                .with_env_filter(debug_filter())
                .init();
        } else {
            eprintln!("Warning: Failed to create log file, logging to stderr");
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(debug_filter())
                .init();
        }
    } else {
        // Normal mode: warnings only, diagnostic echo stays in the sink
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("warn,kdiag::diagnostics=off")
                }),
            )
            .init();
    }
}

fn debug_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,kdiag=debug"))
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("kdiag")
        .join("logs")
}

fn create_log_file() -> Option<std::fs::File> {
    let dir = log_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Warning: Failed to create log directory: {e}");
        return None;
    }
    let path = dir.join(format!(
        "kdiag-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    match std::fs::File::create(&path) {
        Ok(file) => {
            eprintln!("Debug logging enabled: {}", path.display());
            Some(file)
        }
        Err(e) => {
            eprintln!("Warning: Failed to create log file: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kdiag_errors::SinkError;

    #[test]
    fn test_command_error_wins_over_close_error() {
        let command: Result<(), CliError> = Err(CliError::Replay {
            line: 3,
            message: "expected value".to_string(),
        });
        let closed = Err(SinkError::Closed.into());

        let err = finish(command, closed).unwrap_err();
        assert!(matches!(err, CliError::Replay { line: 3, .. }));
    }

    #[test]
    fn test_close_error_surfaces_after_success() {
        let closed = Err(SinkError::Closed.into());
        let err = finish(Ok(7), closed).unwrap_err();
        assert!(matches!(err, CliError::Diagnostics(_)));

        assert_eq!(finish(Ok(7), Ok(())).unwrap(), 7);
    }
}
