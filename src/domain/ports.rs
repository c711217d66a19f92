//! Domain Ports - Core trait definitions for the LVM operator
//!
//! These traits define the boundaries between the workload-building logic and
//! the process environment or the Kubernetes API. Adapters implement these
//! traits to provide concrete functionality.

use crate::error::{Error, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::{Api, Client};
use std::collections::BTreeMap;
use std::sync::Arc;

// =============================================================================
// Environment Source Port
// =============================================================================

/// Port for reading process-level configuration values
pub trait EnvSource: Send + Sync {
    /// Get a value; unset and empty values are both `None`
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

// =============================================================================
// Pod Lookup Port
// =============================================================================

/// Port for reading a running pod
#[async_trait]
pub trait PodLookup: Send + Sync {
    /// Fetch the pod `name` in `namespace`
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod>;
}

/// Pod lookup backed by the Kubernetes API
#[derive(Clone)]
pub struct KubePodLookup {
    client: Client,
}

impl KubePodLookup {
    /// Create a lookup using the given client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PodLookup for KubePodLookup {
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        Ok(pods.get(name).await?)
    }
}

/// Pod lookup for offline use, where no cluster is reachable
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflinePodLookup;

#[async_trait]
impl PodLookup for OfflinePodLookup {
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        Err(Error::Configuration(format!(
            "cannot look up pod {}/{} without a cluster connection",
            namespace, name
        )))
    }
}

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type EnvSourceRef = Arc<dyn EnvSource>;
pub type PodLookupRef = Arc<dyn PodLookup>;
