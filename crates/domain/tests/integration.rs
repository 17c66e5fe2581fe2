//! Integration tests for the domain error handlers

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use kdiag_config::LinkConfig;
    use kdiag_domain::*;
    use kdiag_errors::{Error, SurfaceError};
    use kdiag_handler::{Browser, Clipboard, Editor, ErrorHandler, HandleOutcome, Notifier};
    use kdiag_sink::DiagnosticSink;
    use kdiag_types::{
        ActionId, CustomAction, ErrorContext, ErrorKind, ManualClock, PromptChoice, Severity,
    };
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct Surface {
        answer: Mutex<Option<String>>,
        prompts: Mutex<Vec<(Severity, String, Vec<String>)>>,
        urls: Mutex<Vec<String>>,
        files: Mutex<Vec<PathBuf>>,
        settings: Mutex<Vec<String>>,
    }

    impl Surface {
        fn answer(&self, label: &str) {
            *self.answer.lock().unwrap() = Some(label.to_string());
        }

        fn last_prompt(&self) -> (Severity, String, Vec<String>) {
            self.prompts.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Notifier for Surface {
        async fn prompt(
            &self,
            severity: Severity,
            message: &str,
            choices: &[PromptChoice],
        ) -> Result<Option<ActionId>, SurfaceError> {
            self.prompts.lock().unwrap().push((
                severity,
                message.to_string(),
                choices.iter().map(|c| c.label.clone()).collect(),
            ));
            let answer = self.answer.lock().unwrap().clone();
            Ok(answer.and_then(|label| {
                choices.iter().find(|c| c.label == label).map(|c| c.id)
            }))
        }

        async fn info(&self, _message: &str) {}
    }

    #[async_trait]
    impl Browser for Surface {
        async fn open_url(&self, url: &str) -> Result<(), SurfaceError> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[async_trait]
    impl Clipboard for Surface {
        async fn write_text(&self, _text: &str) -> Result<(), SurfaceError> {
            Ok(())
        }
    }

    #[async_trait]
    impl Editor for Surface {
        async fn open_file(&self, path: &Path) -> Result<(), SurfaceError> {
            self.files.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }

        async fn open_setting(&self, key: &str) -> Result<(), SurfaceError> {
            self.settings.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    fn links() -> LinkConfig {
        LinkConfig {
            kubeconfig_path: Some(PathBuf::from("/tmp/kdiag-test/kubeconfig")),
            ..LinkConfig::default()
        }
    }

    fn setup() -> (DomainErrorHandlers, Arc<Surface>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
        ));
        let surface = Arc::new(Surface::default());
        let handler = ErrorHandler::builder()
            .with_sink(Arc::new(DiagnosticSink::in_memory(clock.clone())))
            .with_clock(clock.clone())
            .with_notifier(surface.clone())
            .with_browser(surface.clone())
            .with_clipboard(surface.clone())
            .build()
            .unwrap();
        let domains = DomainErrorHandlers::new(
            Arc::new(handler),
            surface.clone(),
            surface.clone(),
            links(),
        );
        (domains, surface, clock)
    }

    fn counting(calls: &Arc<AtomicUsize>) -> CustomAction {
        let calls = Arc::clone(calls);
        CustomAction::new("callback", move || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_connection_offers_retry_then_links() {
        let (domains, surface, _) = setup();
        let calls = Arc::new(AtomicUsize::new(0));
        let cause = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        surface.answer("Retry");

        let outcome = domains
            .connection("prod", &cause, &Recovery::new().with_retry(counting(&calls)))
            .await
            .unwrap();

        assert_eq!(outcome, HandleOutcome::Resolved(ActionId::Custom(0)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let (severity, message, labels) = surface.last_prompt();
        assert_eq!(severity, Severity::Error);
        assert_eq!(message, "Failed to connect to cluster \"prod\" (Cluster: prod)");
        assert_eq!(
            labels,
            [
                "Retry",
                "Open Kubeconfig",
                "Troubleshooting Guide",
                "View Logs",
                "Copy Error Details"
            ]
        );
        let log = domains.handler().sink().contents();
        assert!(log.contains("Kind: Connection"));
        assert!(log.contains("TechnicalDetails: refused"));
    }

    #[tokio::test]
    async fn test_open_kubeconfig_uses_configured_path() {
        let (domains, surface, _) = setup();
        let cause = std::io::Error::other("tls handshake failed");
        surface.answer("Open Kubeconfig");

        domains
            .connection("staging", &cause, &Recovery::new())
            .await
            .unwrap();

        assert_eq!(
            *surface.files.lock().unwrap(),
            [PathBuf::from("/tmp/kdiag-test/kubeconfig")]
        );
    }

    #[tokio::test]
    async fn test_cli_not_found_has_only_install_guide() {
        let (domains, surface, _) = setup();
        surface.answer("Installation Guide");

        domains.cli_not_found().await.unwrap();

        let (_, message, labels) = surface.last_prompt();
        assert_eq!(message, "kubectl not found");
        assert_eq!(labels, ["Installation Guide", "View Logs", "Copy Error Details"]);
        assert_eq!(
            *surface.urls.lock().unwrap(),
            [LinkConfig::default().install_guide]
        );
    }

    #[tokio::test]
    async fn test_permission_messages_and_counter() {
        let (domains, surface, _) = setup();

        domains.permission("get", "pods", None).await.unwrap();
        let (_, message, labels) = surface.last_prompt();
        assert_eq!(message, "Permission denied: Cannot get pods (cluster-scoped) (Resource: pods)");
        assert_eq!(labels, ["RBAC Documentation", "View Logs", "Copy Error Details"]);

        domains.permission("delete", "secrets", Some("web")).await.unwrap();
        let (_, message, _) = surface.last_prompt();
        assert!(message.starts_with("Permission denied: Cannot delete secrets in namespace \"web\""));

        assert_eq!(domains.handler().metrics().count(ErrorKind::Permission), 2);
        assert!(domains.handler().sink().contents().contains("StatusCode: 403"));
    }

    #[test]
    fn test_permission_suggests_can_i_check() {
        let surface = Arc::new(Surface::default());
        let links = LinkActions::new(surface.clone(), surface, LinkConfig::default());
        let report = reports::permission("list", "deployments", Some("web"), &links);
        assert!(report
            .suggestions()
            .iter()
            .any(|s| s.contains("kubectl auth can-i list deployments -n web")));
        assert!(report
            .suggestions()
            .iter()
            .any(|s| s == "Required permission: list deployments in namespace \"web\""));
    }

    #[tokio::test]
    async fn test_not_found_runs_refresh() {
        let (domains, surface, _) = setup();
        let calls = Arc::new(AtomicUsize::new(0));
        surface.answer("Refresh");

        domains
            .not_found(
                "pod",
                "api-0",
                Some("web"),
                &Recovery::new().with_refresh(counting(&calls)),
            )
            .await
            .unwrap();

        let (severity, message, _) = surface.last_prompt();
        assert_eq!(severity, Severity::Warning);
        assert!(message.starts_with("pod \"api-0\" not found in namespace \"web\""));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_increase_opens_setting() {
        let (domains, surface, _) = setup();
        surface.answer("Increase Timeout");

        domains
            .timeout("list pods", Duration::from_secs(5), &Recovery::new())
            .await
            .unwrap();

        let (_, message, labels) = surface.last_prompt();
        assert_eq!(message, "Operation timed out after 5 seconds");
        assert_eq!(labels, ["Increase Timeout", "View Logs", "Copy Error Details"]);
        assert_eq!(*surface.settings.lock().unwrap(), ["kdiag.requestTimeout"]);
    }

    #[tokio::test]
    async fn test_repeated_timeouts_prompt_once() {
        let (domains, surface, clock) = setup();

        domains
            .timeout("list pods", Duration::from_secs(5), &Recovery::new())
            .await
            .unwrap();
        clock.advance_ms(1000);
        let second = domains
            .timeout("list pods", Duration::from_secs(5), &Recovery::new())
            .await
            .unwrap();

        assert_eq!(second, HandleOutcome::Suppressed);
        assert_eq!(domains.handler().metrics().count(ErrorKind::Timeout), 2);
        assert_eq!(surface.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_api_router_branches() {
        let (domains, surface, _) = setup();
        let recovery = Recovery::new()
            .with_retry(CustomAction::new("r", || async { Ok(()) }))
            .with_refresh(CustomAction::new("f", || async { Ok(()) }));

        let cases = [
            (ApiFailure::new(401, "token expired"), Severity::Error, "Open Kubeconfig"),
            (ApiFailure::new(409, "object modified"), Severity::Warning, "Refresh"),
            (ApiFailure::new(500, "etcd timeout"), Severity::Error, "Retry"),
        ];
        for (failure, severity, first_label) in cases {
            domains
                .api(&failure, ErrorContext::new(), &recovery)
                .await
                .unwrap();
            let (seen, _, labels) = surface.last_prompt();
            assert_eq!(seen, severity);
            assert_eq!(labels[0], first_label);
        }
        assert_eq!(domains.handler().metrics().count(ErrorKind::Api), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let (domains, surface, _) = setup();
        let failure = ApiFailure::new(429, "Too Many Requests").with_header("Retry-After", "30");

        domains
            .api(&failure, ErrorContext::new(), &Recovery::new())
            .await
            .unwrap();

        let (severity, message, labels) = surface.last_prompt();
        assert_eq!(severity, Severity::Warning);
        assert!(message.contains("30"));
        assert_eq!(labels, ["View Logs", "Copy Error Details"]);
    }

    #[tokio::test]
    async fn test_generic_api_keeps_body_and_does_not_delegate_403() {
        let (domains, surface, _) = setup();
        let failure = ApiFailure::new(403, "forbidden")
            .with_body(r#"{"kind":"Status","reason":"Forbidden"}"#);

        domains
            .api(
                &failure,
                ErrorContext::new().with_cluster("prod"),
                &Recovery::new(),
            )
            .await
            .unwrap();

        let (_, message, labels) = surface.last_prompt();
        assert_eq!(message, "API error (403): forbidden (Cluster: prod)");
        assert_eq!(labels, ["View Logs", "Copy Error Details"]);
        assert_eq!(domains.handler().metrics().count(ErrorKind::Api), 1);
        assert_eq!(domains.handler().metrics().count(ErrorKind::Permission), 0);
        assert!(domains
            .handler()
            .sink()
            .contents()
            .contains(r#"TechnicalDetails: {"kind":"Status","reason":"Forbidden"}"#));
    }

    #[tokio::test]
    async fn test_unexpected_offers_report_issue() {
        let (domains, surface, _) = setup();
        surface.answer("Report Issue");
        let err = std::io::Error::other("tree provider returned no root");

        domains
            .unexpected("refresh tree", &err, ErrorContext::new())
            .await
            .unwrap();

        let (_, message, labels) = surface.last_prompt();
        assert_eq!(
            message,
            "Unexpected error during refresh tree: tree provider returned no root"
        );
        assert_eq!(labels, ["View Logs", "Report Issue", "Copy Error Details"]);
        let urls = surface.urls.lock().unwrap();
        assert!(urls[0].starts_with(&LinkConfig::default().issue_tracker));
    }

    #[tokio::test]
    async fn test_link_failure_becomes_action_error() {
        struct BrokenBrowser;

        #[async_trait]
        impl Browser for BrokenBrowser {
            async fn open_url(&self, url: &str) -> Result<(), SurfaceError> {
                Err(SurfaceError::Browser {
                    url: url.to_string(),
                    message: "no browser".into(),
                })
            }
        }

        let surface = Arc::new(Surface::default());
        let links = LinkActions::new(Arc::new(BrokenBrowser), surface, LinkConfig::default());
        let err = links.rbac_documentation().run().await.unwrap_err();
        let err: Error = err.into();
        assert!(matches!(err, Error::Action(_)));
    }

    #[tokio::test]
    async fn test_validation_is_warning_without_custom_actions() {
        let (domains, surface, _) = setup();
        domains
            .validation("replicas", "must not be negative")
            .await
            .unwrap();
        let (severity, message, labels) = surface.last_prompt();
        assert_eq!(severity, Severity::Warning);
        assert_eq!(message, "Invalid replicas: must not be negative");
        assert_eq!(labels, ["View Logs", "Copy Error Details"]);
    }
}
