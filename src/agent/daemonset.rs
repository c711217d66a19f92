//! vg-manager DaemonSet Builder
//!
//! Builds the desired DaemonSet of the per-node agent for an LVMCluster:
//! placement merged over all device classes, the host mounts needed for
//! device discovery and a privileged root container running in the host PID
//! namespace.

use super::image::ImageResolver;
use super::volumes::host_mounts;
use crate::config::{OperatorConfig, NODE_NAME_ENV, POD_NAME_ENV, POD_NAMESPACE_ENV};
use crate::crd::LVMCluster;
use crate::error::Result;
use crate::placement::PlacementAggregator;
use k8s_openapi::api::apps::v1::{DaemonSet, DaemonSetSpec};
use k8s_openapi::api::core::v1::{
    Container, EnvVar, EnvVarSource, ObjectFieldSelector, PodSpec, PodTemplateSpec,
    SecurityContext,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kube::ResourceExt;
use std::collections::BTreeMap;
use tracing::debug;

/// Builds the agent DaemonSet for an LVMCluster
#[derive(Clone)]
pub struct AgentDaemonSetBuilder {
    config: OperatorConfig,
    resolver: ImageResolver,
}

impl AgentDaemonSetBuilder {
    /// Create a builder
    pub fn new(config: OperatorConfig, resolver: ImageResolver) -> Self {
        Self { config, resolver }
    }

    /// Operator configuration used by this builder
    pub fn config(&self) -> &OperatorConfig {
        &self.config
    }

    /// Build the desired DaemonSet. Fails only when the agent image cannot be
    /// resolved, in which case nothing is built.
    pub async fn build(&self, cluster: &LVMCluster) -> Result<DaemonSet> {
        let placement = PlacementAggregator::aggregate(cluster.device_classes());
        let image = self.resolver.resolve().await?;

        debug!(
            cluster = %cluster.name_any(),
            image = %image,
            unrestricted = placement.is_unrestricted(),
            tolerations = placement.tolerations.len(),
            "Building vg-manager DaemonSet"
        );

        let mounts = host_mounts(&self.config);
        let labels = agent_labels(&self.config, &cluster.name_any());

        let container = Container {
            name: self.config.agent_unit_name.clone(),
            image: Some(image),
            command: Some(vec![self.config.agent_command.clone()]),
            security_context: Some(SecurityContext {
                privileged: Some(true),
                run_as_user: Some(0),
                ..Default::default()
            }),
            volume_mounts: Some(mounts.iter().map(|m| m.volume_mount()).collect()),
            env: Some(vec![
                field_ref_env(NODE_NAME_ENV, "spec.nodeName"),
                field_ref_env(POD_NAMESPACE_ENV, "metadata.namespace"),
                field_ref_env(POD_NAME_ENV, "metadata.name"),
            ]),
            ..Default::default()
        };

        let pod_spec = PodSpec {
            volumes: Some(mounts.iter().map(|m| m.volume()).collect()),
            containers: vec![container],
            // the agent reads /proc/1/mountinfo of the host
            host_pid: Some(true),
            service_account_name: Some(self.config.agent_service_account.clone()),
            affinity: placement.affinity(),
            tolerations: placement.pod_tolerations(),
            ..Default::default()
        };

        Ok(DaemonSet {
            metadata: ObjectMeta {
                name: Some(self.config.agent_unit_name.clone()),
                namespace: Some(self.config.namespace.clone()),
                labels: Some(labels.clone()),
                ..Default::default()
            },
            spec: Some(DaemonSetSpec {
                selector: LabelSelector {
                    match_labels: Some(labels.clone()),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(labels),
                        ..Default::default()
                    }),
                    spec: Some(pod_spec),
                },
                ..Default::default()
            }),
            ..Default::default()
        })
    }
}

/// Labels shared by the DaemonSet, its selector and its pod template
pub fn agent_labels(config: &OperatorConfig, cluster_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app".to_string(), config.agent_unit_name.clone()),
        (config.cluster_label_key.clone(), cluster_name.to_string()),
    ])
}

fn field_ref_env(name: &str, field_path: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value_from: Some(EnvVarSource {
            field_ref: Some(ObjectFieldSelector {
                field_path: field_path.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}
