//! LVMCluster CRD
//!
//! Describes the LVM storage of a cluster as a set of device classes, each
//! with its own device selection and node placement constraints.

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{NodeSelector, Toleration};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// =============================================================================
// LVMCluster CRD
// =============================================================================

/// LVMCluster is the cluster-wide LVM storage configuration. The operator
/// deploys one vg-manager agent DaemonSet per LVMCluster that covers the
/// nodes of every device class.
#[derive(CustomResource, Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "lvm.topolvm.io",
    version = "v1alpha1",
    kind = "LVMCluster",
    plural = "lvmclusters",
    shortname = "lvmc",
    status = "LVMClusterStatus",
    printcolumn = r#"{"name": "State", "type": "string", "jsonPath": ".status.state"}"#,
    printcolumn = r#"{"name": "Ready", "type": "boolean", "jsonPath": ".status.ready"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#,
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct LVMClusterSpec {
    /// Storage layout of the cluster
    #[serde(default)]
    pub storage: Storage,
}

// =============================================================================
// Sub-Types
// =============================================================================

/// Storage section of the LVMCluster spec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Storage {
    /// Device classes, in declaration order
    #[serde(default)]
    pub device_classes: Vec<DeviceClass>,
}

/// A device class is one volume group managed on every node it selects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceClass {
    /// Name of the device class (and of the volume group)
    pub name: String,

    /// Whether this is the default device class
    #[serde(default)]
    pub default: bool,

    /// Devices to use for the volume group; all unused disks when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_selector: Option<DeviceSelector>,

    /// Thin pool carved out of the volume group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thin_pool_config: Option<ThinPoolConfig>,

    /// Nodes this device class applies to; every node when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<NodeSelector>,

    /// Tolerations the agent needs to reach the nodes of this class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<Toleration>>,
}

/// Explicit device list for a device class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSelector {
    /// Device paths, e.g. `/dev/sdb` or `/dev/disk/by-path/...`
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Thin pool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThinPoolConfig {
    /// Name of the thin pool logical volume
    pub name: String,

    /// Percentage of the volume group used by the thin pool
    #[serde(default = "default_size_percent")]
    pub size_percent: u32,

    /// Overprovisioning ratio of the thin pool
    #[serde(default = "default_overprovision_ratio")]
    pub overprovision_ratio: u32,
}

// =============================================================================
// Status
// =============================================================================

/// Status of the LVMCluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LVMClusterStatus {
    /// Whether the agent DaemonSet has been applied
    #[serde(default)]
    pub ready: bool,

    /// Current state
    #[serde(default)]
    pub state: ClusterState,

    /// Last reconcile time
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub last_reconcile_time: Option<DateTime<Utc>>,

    /// Human-readable message for the current state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// LVMCluster lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ClusterState {
    #[default]
    Initializing,
    Progressing,
    Ready,
    Failed,
}

impl std::fmt::Display for ClusterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterState::Initializing => write!(f, "Initializing"),
            ClusterState::Progressing => write!(f, "Progressing"),
            ClusterState::Ready => write!(f, "Ready"),
            ClusterState::Failed => write!(f, "Failed"),
        }
    }
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_size_percent() -> u32 {
    90
}

fn default_overprovision_ratio() -> u32 {
    10
}

// =============================================================================
// Implementations
// =============================================================================

impl LVMCluster {
    /// Device classes in declaration order
    pub fn device_classes(&self) -> &[DeviceClass] {
        &self.spec.storage.device_classes
    }
}

impl LVMClusterStatus {
    /// Status after a successful reconcile
    pub fn ready(now: DateTime<Utc>) -> Self {
        Self {
            ready: true,
            state: ClusterState::Ready,
            last_reconcile_time: Some(now),
            message: None,
        }
    }

    /// Status after a failed reconcile
    pub fn failed(now: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            ready: false,
            state: ClusterState::Failed,
            last_reconcile_time: Some(now),
            message: Some(message.into()),
        }
    }
}
