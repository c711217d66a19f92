//! Offline Rendering
//!
//! Builds the agent DaemonSet for an LVMCluster manifest without talking to
//! a cluster, for inspection and GitOps pipelines.

use super::daemonset::AgentDaemonSetBuilder;
use crate::crd::LVMCluster;
use crate::error::Result;

/// Render the DaemonSet YAML for an LVMCluster YAML manifest
pub async fn render_manifest(builder: &AgentDaemonSetBuilder, manifest: &str) -> Result<String> {
    let cluster: LVMCluster = serde_yaml::from_str(manifest)?;
    let daemonset = builder.build(&cluster).await?;
    Ok(serde_yaml::to_string(&daemonset)?)
}
