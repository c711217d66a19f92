//! Cluster Client
//!
//! The writes the reconciler makes against the API server, behind a trait so
//! reconciliation can run against a mock.

use crate::config::OperatorConfig;
use crate::crd::{LVMCluster, LVMClusterStatus};
use crate::error::Result;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::DaemonSet;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use serde_json::json;

#[cfg(test)]
use mockall::automock;

/// API server writes made by the LVMCluster reconciler
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Server-side apply the agent DaemonSet
    async fn apply_daemonset(&self, daemonset: &DaemonSet) -> Result<()>;

    /// Merge-patch the status of an LVMCluster
    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: &LVMClusterStatus,
    ) -> Result<()>;
}

/// [`ClusterClient`] backed by a kube [`Client`]
pub struct KubeClusterClient {
    client: Client,
    namespace: String,
    field_manager: String,
}

impl KubeClusterClient {
    pub fn new(client: Client, config: &OperatorConfig) -> Self {
        Self {
            client,
            namespace: config.namespace.clone(),
            field_manager: config.field_manager.clone(),
        }
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn apply_daemonset(&self, daemonset: &DaemonSet) -> Result<()> {
        let daemonsets: Api<DaemonSet> = Api::namespaced(self.client.clone(), &self.namespace);
        daemonsets
            .patch(
                &daemonset.name_any(),
                &PatchParams::apply(&self.field_manager).force(),
                &Patch::Apply(daemonset),
            )
            .await?;
        Ok(())
    }

    async fn patch_status(
        &self,
        namespace: &str,
        name: &str,
        status: &LVMClusterStatus,
    ) -> Result<()> {
        let clusters: Api<LVMCluster> = Api::namespaced(self.client.clone(), namespace);
        clusters
            .patch_status(
                name,
                &PatchParams::default(),
                &Patch::Merge(json!({ "status": status })),
            )
            .await?;
        Ok(())
    }
}
