//! Built-in defaults for kdiag configuration

/// Repeated identical errors inside this window are logged but not shown.
pub const THROTTLE_WINDOW_MS: u64 = 5_000;

/// Throttle keys kept before stale entries are swept.
pub const THROTTLE_MAX_ENTRIES: usize = 1_024;

pub const ISSUE_TRACKER_URL: &str = "https://github.com/org/kdiag/issues/new";
pub const KUBECONFIG_DOCS_URL: &str =
    "https://kubernetes.io/docs/concepts/configuration/organize-cluster-access-kubeconfig/";
pub const TROUBLESHOOTING_URL: &str =
    "https://kubernetes.io/docs/tasks/debug/debug-cluster/";
pub const INSTALL_GUIDE_URL: &str = "https://kubernetes.io/docs/tasks/tools/";
pub const RBAC_DOCS_URL: &str = "https://kubernetes.io/docs/reference/access-authn-authz/rbac/";

/// Settings key opened by the "Increase Timeout" action.
pub const TIMEOUT_SETTING_KEY: &str = "kdiag.requestTimeout";
