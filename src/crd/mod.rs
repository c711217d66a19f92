//! Custom Resource Definitions for the LVM Operator
//!
//! - LVMCluster: cluster-wide LVM storage configuration with device classes

pub mod lvm_cluster;

pub use lvm_cluster::*;
