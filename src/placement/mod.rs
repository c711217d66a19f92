//! Placement Module
//!
//! Merges per-device-class node selection and tolerations into one policy
//! for the agent DaemonSet.

pub mod aggregator;

pub use aggregator::*;
