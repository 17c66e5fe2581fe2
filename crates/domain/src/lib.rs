#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Domain error handlers for kdiag
//!
//! One entry point per failure domain. Each turns the raw failure and its
//! parameters into an [`ErrorReport`](kdiag_types::ErrorReport) and hands it
//! to the shared [`ErrorHandler`].

pub mod api;
pub mod links;
pub mod reports;

pub use api::{ApiFailure, ApiRoute};
pub use links::LinkActions;
pub use reports::{format_duration, Recovery};

use kdiag_config::LinkConfig;
use kdiag_errors::Error;
use kdiag_handler::{Browser, Editor, ErrorHandler, HandleOutcome};
use kdiag_types::ErrorContext;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Domain-specific front door to the error handler.
#[derive(Clone)]
pub struct DomainErrorHandlers {
    handler: Arc<ErrorHandler>,
    links: LinkActions,
}

impl DomainErrorHandlers {
    #[must_use]
    pub fn new(
        handler: Arc<ErrorHandler>,
        browser: Arc<dyn Browser>,
        editor: Arc<dyn Editor>,
        links: LinkConfig,
    ) -> Self {
        Self {
            handler,
            links: LinkActions::new(browser, editor, links),
        }
    }

    #[must_use]
    pub fn handler(&self) -> &ErrorHandler {
        &self.handler
    }

    /// The cluster could not be reached.
    ///
    /// # Errors
    ///
    /// Propagates prompt and action failures from the error handler.
    pub async fn connection(
        &self,
        cluster: &str,
        cause: &(dyn StdError + Send + Sync + 'static),
        recovery: &Recovery,
    ) -> Result<HandleOutcome, Error> {
        debug!(cluster, "connection failure");
        self.handler
            .handle_error(reports::connection(cluster, cause, recovery, &self.links))
            .await
    }

    /// The cluster CLI is not installed.
    ///
    /// # Errors
    ///
    /// Propagates prompt and action failures from the error handler.
    pub async fn cli_not_found(&self) -> Result<HandleOutcome, Error> {
        self.handler
            .handle_error(reports::cli_not_found(&self.links))
            .await
    }

    /// The API refused `verb` on `resource`. `None` namespace means the
    /// resource is cluster-scoped.
    ///
    /// # Errors
    ///
    /// Propagates prompt and action failures from the error handler.
    pub async fn permission(
        &self,
        verb: &str,
        resource: &str,
        namespace: Option<&str>,
    ) -> Result<HandleOutcome, Error> {
        self.handler
            .handle_error(reports::permission(verb, resource, namespace, &self.links))
            .await
    }

    /// # Errors
    ///
    /// Propagates prompt and action failures from the error handler.
    pub async fn not_found(
        &self,
        resource_type: &str,
        name: &str,
        namespace: Option<&str>,
        recovery: &Recovery,
    ) -> Result<HandleOutcome, Error> {
        self.handler
            .handle_error(reports::not_found(resource_type, name, namespace, recovery))
            .await
    }

    /// # Errors
    ///
    /// Propagates prompt and action failures from the error handler.
    pub async fn timeout(
        &self,
        operation: &str,
        elapsed: Duration,
        recovery: &Recovery,
    ) -> Result<HandleOutcome, Error> {
        self.handler
            .handle_error(reports::timeout(operation, elapsed, recovery, &self.links))
            .await
    }

    /// # Errors
    ///
    /// Propagates prompt and action failures from the error handler.
    pub async fn api(
        &self,
        failure: &ApiFailure,
        context: ErrorContext,
        recovery: &Recovery,
    ) -> Result<HandleOutcome, Error> {
        debug!(status_code = failure.status_code, route = ?failure.route(), "api failure");
        self.handler
            .handle_error(reports::api(failure, context, recovery, &self.links))
            .await
    }

    /// # Errors
    ///
    /// Propagates prompt failures from the error handler.
    pub async fn validation(&self, field: &str, reason: &str) -> Result<HandleOutcome, Error> {
        self.handler
            .handle_error(reports::validation(field, reason))
            .await
    }

    /// A failure no other domain claims.
    ///
    /// # Errors
    ///
    /// Propagates prompt and action failures from the error handler.
    pub async fn unexpected(
        &self,
        operation: &str,
        err: &(dyn StdError + Send + Sync + 'static),
        context: ErrorContext,
    ) -> Result<HandleOutcome, Error> {
        self.handler
            .handle_error(reports::unexpected(operation, err, context))
            .await
    }
}
