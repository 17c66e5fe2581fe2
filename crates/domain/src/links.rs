//! Built-in remediation actions that open documentation, files or settings

use kdiag_config::LinkConfig;
use kdiag_errors::ActionError;
use kdiag_handler::{Browser, Editor};
use kdiag_types::CustomAction;
use std::sync::Arc;

pub const OPEN_KUBECONFIG: &str = "Open Kubeconfig";
pub const TROUBLESHOOTING_GUIDE: &str = "Troubleshooting Guide";
pub const INSTALLATION_GUIDE: &str = "Installation Guide";
pub const RBAC_DOCUMENTATION: &str = "RBAC Documentation";
pub const INCREASE_TIMEOUT: &str = "Increase Timeout";

/// Factory for link actions bound to the configured targets.
#[derive(Clone)]
pub struct LinkActions {
    browser: Arc<dyn Browser>,
    editor: Arc<dyn Editor>,
    links: LinkConfig,
}

impl LinkActions {
    #[must_use]
    pub fn new(browser: Arc<dyn Browser>, editor: Arc<dyn Editor>, links: LinkConfig) -> Self {
        Self {
            browser,
            editor,
            links,
        }
    }

    #[must_use]
    pub fn links(&self) -> &LinkConfig {
        &self.links
    }

    #[must_use]
    pub fn open_kubeconfig(&self) -> CustomAction {
        let editor = Arc::clone(&self.editor);
        let path = self.links.kubeconfig();
        CustomAction::new(OPEN_KUBECONFIG, move || {
            let editor = Arc::clone(&editor);
            let path = path.clone();
            async move {
                editor
                    .open_file(&path)
                    .await
                    .map_err(|e| ActionError::failed(OPEN_KUBECONFIG, e.to_string()))
            }
        })
    }

    #[must_use]
    pub fn troubleshooting_guide(&self) -> CustomAction {
        self.open_url(TROUBLESHOOTING_GUIDE, &self.links.troubleshooting)
    }

    #[must_use]
    pub fn installation_guide(&self) -> CustomAction {
        self.open_url(INSTALLATION_GUIDE, &self.links.install_guide)
    }

    #[must_use]
    pub fn rbac_documentation(&self) -> CustomAction {
        self.open_url(RBAC_DOCUMENTATION, &self.links.rbac_docs)
    }

    #[must_use]
    pub fn increase_timeout(&self) -> CustomAction {
        let editor = Arc::clone(&self.editor);
        let key = self.links.timeout_setting.clone();
        CustomAction::new(INCREASE_TIMEOUT, move || {
            let editor = Arc::clone(&editor);
            let key = key.clone();
            async move {
                editor
                    .open_setting(&key)
                    .await
                    .map_err(|e| ActionError::failed(INCREASE_TIMEOUT, e.to_string()))
            }
        })
    }

    fn open_url(&self, label: &'static str, url: &str) -> CustomAction {
        let browser = Arc::clone(&self.browser);
        let url = url.to_string();
        CustomAction::new(label, move || {
            let browser = Arc::clone(&browser);
            let url = url.clone();
            async move {
                browser
                    .open_url(&url)
                    .await
                    .map_err(|e| ActionError::failed(label, e.to_string()))
            }
        })
    }
}
