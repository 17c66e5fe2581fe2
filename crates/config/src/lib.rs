#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for kdiag
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/kdiag/config.toml)
//! - Environment variables
//! - CLI flags

pub mod constants;

use kdiag_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub throttle: ThrottleConfig,

    #[serde(default)]
    pub sink: SinkConfig,

    #[serde(default)]
    pub links: LinkConfig,

    #[serde(default)]
    pub environment: EnvironmentConfig,
}

/// Deduplication window for repeated identical errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

/// Diagnostic log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_echo_to_tracing")]
    pub echo_to_tracing: bool,
}

/// Targets opened by remediation actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default = "default_issue_tracker")]
    pub issue_tracker: String,
    #[serde(default = "default_kubeconfig_docs")]
    pub kubeconfig_docs: String,
    #[serde(default = "default_troubleshooting")]
    pub troubleshooting: String,
    #[serde(default = "default_install_guide")]
    pub install_guide: String,
    #[serde(default = "default_rbac_docs")]
    pub rbac_docs: String,
    pub kubeconfig_path: Option<PathBuf>,
    #[serde(default = "default_timeout_setting")]
    pub timeout_setting: String,
}

/// Values reported in the Environment section of issue reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default = "default_host_version")]
    pub host_version: String,
}

// Default implementations

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            window_ms: constants::THROTTLE_WINDOW_MS,
            max_entries: constants::THROTTLE_MAX_ENTRIES,
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            echo_to_tracing: true,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            issue_tracker: default_issue_tracker(),
            kubeconfig_docs: default_kubeconfig_docs(),
            troubleshooting: default_troubleshooting(),
            install_guide: default_install_guide(),
            rbac_docs: default_rbac_docs(),
            kubeconfig_path: None,
            timeout_setting: default_timeout_setting(),
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            host_version: default_host_version(),
        }
    }
}

// Default value functions for serde
fn default_window_ms() -> u64 {
    constants::THROTTLE_WINDOW_MS
}

fn default_max_entries() -> usize {
    constants::THROTTLE_MAX_ENTRIES
}

fn default_echo_to_tracing() -> bool {
    true
}

fn default_issue_tracker() -> String {
    constants::ISSUE_TRACKER_URL.to_string()
}

fn default_kubeconfig_docs() -> String {
    constants::KUBECONFIG_DOCS_URL.to_string()
}

fn default_troubleshooting() -> String {
    constants::TROUBLESHOOTING_URL.to_string()
}

fn default_install_guide() -> String {
    constants::INSTALL_GUIDE_URL.to_string()
}

fn default_rbac_docs() -> String {
    constants::RBAC_DOCS_URL.to_string()
}

fn default_timeout_setting() -> String {
    constants::TIMEOUT_SETTING_KEY.to_string()
}

fn default_host_version() -> String {
    "terminal".to_string()
}

impl ThrottleConfig {
    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl LinkConfig {
    /// Kubeconfig location: configured path, then `$KUBECONFIG`, then
    /// `~/.kube/config`.
    #[must_use]
    pub fn kubeconfig(&self) -> PathBuf {
        if let Some(path) = &self.kubeconfig_path {
            return path.clone();
        }
        if let Some(first) = std::env::var_os("KUBECONFIG")
            .as_deref()
            .and_then(|paths| std::env::split_paths(paths).next())
            .filter(|path| !path.as_os_str().is_empty())
        {
            return first;
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".kube")
            .join("config")
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("kdiag").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        let config: Self = toml::from_str(&contents).map_err(ConfigError::from)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // KDIAG_THROTTLE_MS
        if let Ok(window) = std::env::var("KDIAG_THROTTLE_MS") {
            self.throttle.window_ms = window.parse().map_err(|_| ConfigError::InvalidValue {
                field: "KDIAG_THROTTLE_MS".to_string(),
                value: window,
            })?;
        }

        // KDIAG_THROTTLE_MAX
        if let Ok(max) = std::env::var("KDIAG_THROTTLE_MAX") {
            self.throttle.max_entries = match max.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "KDIAG_THROTTLE_MAX".to_string(),
                        value: max,
                    }
                    .into())
                }
            };
        }

        // KDIAG_LOG_FILE
        if let Ok(path) = std::env::var("KDIAG_LOG_FILE") {
            if path.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "KDIAG_LOG_FILE".to_string(),
                    value: path,
                }
                .into());
            }
            self.sink.log_file = Some(PathBuf::from(path));
        }

        // KDIAG_ISSUE_URL
        if let Ok(url) = std::env::var("KDIAG_ISSUE_URL") {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::InvalidValue {
                    field: "KDIAG_ISSUE_URL".to_string(),
                    value: url,
                }
                .into());
            }
            self.links.issue_tracker = url;
        }

        Ok(())
    }
}
