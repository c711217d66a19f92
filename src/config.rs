//! Operator Configuration
//!
//! Fixed names and host paths used when building the vg-manager DaemonSet,
//! gathered into one immutable value that is built at startup and passed to
//! the builder and the image resolver.

use std::time::Duration;

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Explicit agent image override
pub const AGENT_IMAGE_ENV: &str = "AGENT_IMAGE";

/// Name of the running operator pod (downward API)
pub const POD_NAME_ENV: &str = "POD_NAME";

/// Namespace of the running operator pod (downward API)
pub const POD_NAMESPACE_ENV: &str = "POD_NAMESPACE";

/// Name of the node the agent runs on (downward API)
pub const NODE_NAME_ENV: &str = "NODE_NAME";

// =============================================================================
// Operator Configuration
// =============================================================================

/// Configuration for building and applying the agent workload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorConfig {
    /// Namespace the operator and its agent DaemonSet live in
    pub namespace: String,
    /// Agent unit name: DaemonSet name, container name and `app` label
    pub agent_unit_name: String,
    /// Service account the agent pods run under
    pub agent_service_account: String,
    /// Startup command of the agent container
    pub agent_command: String,
    /// Directory under `/etc` holding the agent's lvmd configuration
    pub agent_config_dirname: String,
    /// Label key carrying the owning LVMCluster name
    pub cluster_label_key: String,
    /// Name of the operator's own container, used for image self-lookup
    pub operator_container_name: String,
    /// Upper bound on the operator pod self-lookup
    pub lookup_timeout: Duration,
    /// Field manager name for server-side apply
    pub field_manager: String,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            namespace: "openshift-storage".to_string(),
            agent_unit_name: "vg-manager".to_string(),
            agent_service_account: "vg-manager".to_string(),
            agent_command: "/vgmanager".to_string(),
            agent_config_dirname: "topolvm".to_string(),
            cluster_label_key: "topolvm.io/lvmcluster".to_string(),
            operator_container_name: "manager".to_string(),
            lookup_timeout: Duration::from_secs(10),
            field_manager: "lvm-operator".to_string(),
        }
    }
}

impl OperatorConfig {
    /// Host (and container) path of the agent configuration directory
    pub fn agent_config_dir(&self) -> String {
        format!("/etc/{}", self.agent_config_dirname)
    }

    /// Override the operator namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Override the self-lookup timeout
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OperatorConfig::default();
        assert_eq!(config.agent_config_dir(), "/etc/topolvm");
        assert_eq!(config.agent_unit_name, "vg-manager");
        assert_eq!(config.lookup_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = OperatorConfig::default()
            .with_namespace("lvm-system")
            .with_lookup_timeout(Duration::from_millis(250));
        assert_eq!(config.namespace, "lvm-system");
        assert_eq!(config.lookup_timeout, Duration::from_millis(250));
    }
}
