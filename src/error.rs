//! Error types for the LVM Operator
//!
//! Provides structured error types for agent image resolution, DaemonSet
//! construction and the reconciliation controller.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for the operator
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    // =========================================================================
    // Kubernetes Errors
    // =========================================================================
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    // =========================================================================
    // Image Resolution Errors
    // =========================================================================
    #[error("Missing required environment value: {name}")]
    MissingEnvironmentValue { name: String },

    #[error("Failed to get pod {pod} in namespace {namespace}: {source}")]
    SelfLookupFailed {
        pod: String,
        namespace: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to get container image for {container} in pod {pod}")]
    ContainerNotFound { container: String, pod: String },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Action to take on error during reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Requeue with exponential backoff
    RequeueWithBackoff,
    /// Requeue after specific duration
    RequeueAfter(Duration),
    /// Don't requeue, wait for changes
    NoRequeue,
}

impl Error {
    /// Determine what action to take for this error
    pub fn action(&self) -> ErrorAction {
        match self {
            // Transient errors - retry with backoff
            Error::Kube(_) | Error::Timeout(_) | Error::SelfLookupFailed { .. } => {
                ErrorAction::RequeueWithBackoff
            }

            // Deployment mismatch - only a rollout of the operator fixes these
            Error::MissingEnvironmentValue { .. } | Error::ContainerNotFound { .. } => {
                ErrorAction::RequeueAfter(Duration::from_secs(300))
            }

            // Configuration/validation errors - don't retry automatically
            Error::Configuration(_) | Error::YamlParse(_) => ErrorAction::NoRequeue,

            // All other errors - retry with backoff
            _ => ErrorAction::RequeueWithBackoff,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        !matches!(self.action(), ErrorAction::NoRequeue)
    }

    /// Check if this error is transient
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Kube(_) | Error::Timeout(_) | Error::SelfLookupFailed { .. }
        )
    }

    /// Short machine-friendly label, used as a metrics dimension
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Internal(_) => "internal",
            Error::Configuration(_) => "configuration",
            Error::Timeout(_) => "timeout",
            Error::Kube(_) => "kube",
            Error::MissingEnvironmentValue { .. } => "missing_environment_value",
            Error::SelfLookupFailed { .. } => "self_lookup_failed",
            Error::ContainerNotFound { .. } => "container_not_found",
            Error::YamlParse(_) => "yaml_parse",
            Error::Io(_) => "io",
        }
    }
}

/// Result type alias for the operator
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn lookup_failed(source: Error) -> Error {
        Error::SelfLookupFailed {
            pod: "op-123".into(),
            namespace: "openshift-storage".into(),
            source: Box::new(source),
        }
    }

    #[test]
    fn test_error_actions() {
        let err = lookup_failed(Error::Internal("connection refused".into()));
        assert_eq!(err.action(), ErrorAction::RequeueWithBackoff);

        let err = Error::ContainerNotFound {
            container: "manager".into(),
            pod: "lvm-operator-0".into(),
        };
        assert_eq!(
            err.action(),
            ErrorAction::RequeueAfter(Duration::from_secs(300))
        );

        let err = Error::Configuration("bad config".into());
        assert_eq!(err.action(), ErrorAction::NoRequeue);
    }

    #[test]
    fn test_error_retryable() {
        let transient = lookup_failed(Error::Timeout(Duration::from_secs(10)));
        assert!(transient.is_retryable());
        assert!(transient.is_transient());

        let missing = Error::MissingEnvironmentValue {
            name: "POD_NAME".into(),
        };
        assert!(missing.is_retryable());
        assert!(!missing.is_transient());

        let config_err = Error::Configuration("invalid".into());
        assert!(!config_err.is_retryable());
        assert!(!config_err.is_transient());
    }

    #[test]
    fn test_lookup_failure_keeps_source() {
        let err = lookup_failed(Error::Internal("pods \"op-123\" not found".into()));
        let msg = err.to_string();
        assert!(msg.contains("op-123"));
        assert!(msg.contains("openshift-storage"));

        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "Internal error: pods \"op-123\" not found");
    }

    #[test]
    fn test_yaml_errors_await_change() {
        let err: Error = serde_yaml::from_str::<u32>("not: [a number")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "yaml_parse");
        assert_eq!(err.action(), ErrorAction::NoRequeue);
    }

    #[test]
    fn test_container_not_found_message() {
        let err = Error::ContainerNotFound {
            container: "manager".into(),
            pod: "op-123".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to get container image for manager in pod op-123"
        );
        assert_eq!(err.kind(), "container_not_found");
    }
}
