//! Placement Aggregation
//!
//! Merges the node selectors and tolerations of every device class into the
//! single placement policy used by the agent DaemonSet. The agent has to run
//! wherever at least one device class wants it, so the broadest class wins.

use crate::crd::DeviceClass;
use k8s_openapi::api::core::v1::{
    Affinity, NodeAffinity, NodeSelector, NodeSelectorTerm, Toleration,
};

// =============================================================================
// Aggregated Placement
// =============================================================================

/// Workload-wide placement derived from all device classes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedPlacement {
    /// Merged node selector; `None` means every node
    pub node_selector: Option<NodeSelector>,
    /// Deduplicated tolerations in order of first appearance
    pub tolerations: Vec<Toleration>,
}

impl AggregatedPlacement {
    /// Whether the agent may be scheduled on any node
    pub fn is_unrestricted(&self) -> bool {
        self.node_selector.is_none()
    }

    /// Required node affinity for the merged selector, if restricted
    pub fn affinity(&self) -> Option<Affinity> {
        self.node_selector.as_ref().map(|selector| Affinity {
            node_affinity: Some(NodeAffinity {
                required_during_scheduling_ignored_during_execution: Some(selector.clone()),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    /// Tolerations in the optional form a pod spec expects
    pub fn pod_tolerations(&self) -> Option<Vec<Toleration>> {
        if self.tolerations.is_empty() {
            None
        } else {
            Some(self.tolerations.clone())
        }
    }
}

// =============================================================================
// Placement Aggregator
// =============================================================================

/// Stateless merger of per-device-class placement
pub struct PlacementAggregator;

impl PlacementAggregator {
    /// Aggregate placement over device classes in declaration order
    pub fn aggregate(device_classes: &[DeviceClass]) -> AggregatedPlacement {
        AggregatedPlacement {
            node_selector: Self::merge_node_selectors(device_classes),
            tolerations: Self::merge_tolerations(device_classes),
        }
    }

    /// Any class without a selector makes the result unrestricted. Otherwise
    /// the terms are ORed together, which is how Kubernetes evaluates
    /// `nodeSelectorTerms`.
    fn merge_node_selectors(device_classes: &[DeviceClass]) -> Option<NodeSelector> {
        if device_classes.is_empty() {
            return None;
        }

        let mut terms: Vec<NodeSelectorTerm> = Vec::new();
        for class in device_classes {
            let class_terms = match &class.node_selector {
                Some(selector) if !selector.node_selector_terms.is_empty() => {
                    &selector.node_selector_terms
                }
                _ => return None,
            };

            for term in class_terms {
                if !terms.contains(term) {
                    terms.push(term.clone());
                }
            }
        }

        Some(NodeSelector {
            node_selector_terms: terms,
        })
    }

    fn merge_tolerations(device_classes: &[DeviceClass]) -> Vec<Toleration> {
        let mut merged: Vec<Toleration> = Vec::new();
        for toleration in device_classes
            .iter()
            .filter_map(|class| class.tolerations.as_ref())
            .flatten()
        {
            if !merged.contains(toleration) {
                merged.push(toleration.clone());
            }
        }
        merged
    }
}
