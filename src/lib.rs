//! LVM Operator
//!
//! A Kubernetes operator that deploys the vg-manager agent to every node
//! selected by the device classes of an `LVMCluster`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     LVMCluster Controller                        │
//! │              (watch, server-side apply, status)                  │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                  Agent DaemonSet Builder                         │
//! │  ┌─────────────────────┐  ┌───────────────┐  ┌────────────────┐  │
//! │  │ Placement Aggregator│  │  Host Mounts  │  │ Image Resolver │  │
//! │  │ (selectors, tolera- │  │ (/etc/topolvm,│  │ (AGENT_IMAGE / │  │
//! │  │  tions per class)   │  │  /dev, udev,  │  │  own pod)      │  │
//! │  └─────────────────────┘  │  /sys)        │  └───────┬────────┘  │
//! │                           └───────────────┘          │           │
//! ├──────────────────────────────────────────────────────┼───────────┤
//! │                        Domain Ports                  │           │
//! │            EnvSource (process env)   PodLookup (kube API)        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`agent`]: vg-manager DaemonSet, host mounts and image resolution
//! - [`placement`]: Placement aggregation across device classes
//! - [`controller`]: LVMCluster reconciler and metrics
//! - [`crd`]: Custom Resource Definitions
//! - [`domain`]: Port traits and their adapters
//! - [`config`]: Operator configuration
//! - [`error`]: Error types and handling

pub mod agent;
pub mod config;
pub mod controller;
pub mod crd;
pub mod domain;
pub mod error;
pub mod placement;

// Re-export commonly used types
pub use agent::{AgentDaemonSetBuilder, HostMount, ImageResolver};

pub use config::OperatorConfig;

pub use controller::{ClusterClient, Context, ControllerMetrics, KubeClusterClient};

pub use crd::{
    ClusterState, DeviceClass, LVMCluster, LVMClusterSpec, LVMClusterStatus, Storage,
    ThinPoolConfig,
};

pub use domain::ports::{EnvSource, KubePodLookup, PodLookup, ProcessEnv};

pub use error::{Error, ErrorAction, Result};

pub use placement::{AggregatedPlacement, PlacementAggregator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
