//! LVMCluster Controller
//!
//! Watches LVMCluster resources and keeps the vg-manager DaemonSet in sync.

pub mod client;
pub mod metrics;
pub mod reconciler;

pub use client::*;
pub use metrics::*;
pub use reconciler::*;

use crate::crd::LVMCluster;
use futures::StreamExt;
use k8s_openapi::api::apps::v1::DaemonSet;
use kube::runtime::{watcher, Controller};
use kube::{Api, Client};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run the controller until a shutdown signal is received
pub async fn run(client: Client, ctx: Arc<Context>) {
    let config = ctx.builder.config();
    let clusters: Api<LVMCluster> = Api::all(client.clone());
    let daemonsets: Api<DaemonSet> = Api::namespaced(client, &config.namespace);

    info!(namespace = %config.namespace, "Starting LVMCluster controller");

    Controller::new(clusters, watcher::Config::default())
        .owns(daemonsets, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx.clone())
        .for_each(|result| async move {
            match result {
                Ok((object, action)) => {
                    debug!(cluster = %object.name, ?action, "LVMCluster reconciliation completed");
                }
                Err(e) => {
                    warn!(error = %e, "LVMCluster controller error");
                }
            }
        })
        .await;

    info!("LVMCluster controller stopped");
}
