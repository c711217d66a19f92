//! LVMCluster Reconciler
//!
//! Applies the vg-manager DaemonSet built for each LVMCluster and records the
//! outcome in the LVMCluster status. Retry timing is left to the controller
//! runtime through [`error_policy`].

use super::client::ClusterClient;
use super::metrics::ControllerMetrics;
use crate::agent::AgentDaemonSetBuilder;
use crate::crd::{LVMCluster, LVMClusterStatus};
use crate::error::{Error, ErrorAction, Result};
use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::runtime::controller::Action;
use kube::{Resource, ResourceExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Periodic resync of a healthy LVMCluster
const RESYNC_INTERVAL: Duration = Duration::from_secs(300);

/// First retry delay for transient failures
const BACKOFF_INTERVAL: Duration = Duration::from_secs(5);

/// Shared state of the reconciler
pub struct Context {
    pub client: Arc<dyn ClusterClient>,
    pub builder: AgentDaemonSetBuilder,
    pub metrics: ControllerMetrics,
}

/// Reconcile one LVMCluster
pub async fn reconcile(cluster: Arc<LVMCluster>, ctx: Arc<Context>) -> Result<Action> {
    let started = Instant::now();
    ctx.metrics.reconciliations.inc();

    let result = apply_daemonset(&cluster, &ctx).await;
    ctx.metrics
        .reconcile_duration
        .observe(started.elapsed().as_secs_f64());

    record_status(&cluster, &ctx, &result).await;

    result.map(|()| Action::requeue(RESYNC_INTERVAL))
}

/// Map a reconcile failure to the next controller action
pub fn error_policy(cluster: Arc<LVMCluster>, error: &Error, ctx: Arc<Context>) -> Action {
    error!(
        cluster = %cluster.name_any(),
        error = %error,
        retryable = error.is_retryable(),
        "LVMCluster reconciliation failed"
    );
    ctx.metrics.record_failure(error.kind());
    action_for(error)
}

/// Controller action for an error
pub fn action_for(error: &Error) -> Action {
    match error.action() {
        ErrorAction::RequeueWithBackoff => Action::requeue(BACKOFF_INTERVAL),
        ErrorAction::RequeueAfter(delay) => Action::requeue(delay),
        ErrorAction::NoRequeue => Action::await_change(),
    }
}

/// Status to write after a reconcile, or `None` if the current one already
/// says the same thing.
///
/// The watch on LVMCluster sees status writes, so patching an unchanged
/// status (with a fresh timestamp) would requeue the cluster immediately.
pub fn next_status(
    current: Option<&LVMClusterStatus>,
    outcome: &Result<()>,
    now: DateTime<Utc>,
) -> Option<LVMClusterStatus> {
    let desired = match outcome {
        Ok(()) => LVMClusterStatus::ready(now),
        Err(e) => LVMClusterStatus::failed(now, e.to_string()),
    };
    match current {
        Some(current)
            if current.ready == desired.ready
                && current.state == desired.state
                && current.message == desired.message =>
        {
            None
        }
        _ => Some(desired),
    }
}

/// Controller owner reference for the agent DaemonSet; owner references
/// cannot cross namespaces
fn owner_reference(cluster: &LVMCluster, namespace: &str) -> Option<OwnerReference> {
    if cluster.namespace().as_deref() != Some(namespace) {
        return None;
    }
    cluster.controller_owner_ref(&())
}

async fn apply_daemonset(cluster: &LVMCluster, ctx: &Context) -> Result<()> {
    let config = ctx.builder.config();
    let mut daemonset = ctx.builder.build(cluster).await?;

    if let Some(owner) = owner_reference(cluster, &config.namespace) {
        daemonset.metadata.owner_references = Some(vec![owner]);
    }

    ctx.client.apply_daemonset(&daemonset).await?;

    info!(
        cluster = %cluster.name_any(),
        daemonset = %config.agent_unit_name,
        namespace = %config.namespace,
        "Applied vg-manager DaemonSet"
    );
    Ok(())
}

async fn record_status(cluster: &LVMCluster, ctx: &Context, result: &Result<()>) {
    let Some(status) = next_status(cluster.status.as_ref(), result, Utc::now()) else {
        debug!(cluster = %cluster.name_any(), "LVMCluster status unchanged");
        return;
    };
    let Some(namespace) = cluster.namespace() else {
        warn!(cluster = %cluster.name_any(), "LVMCluster has no namespace, skipping status");
        return;
    };
    if let Err(e) = ctx
        .client
        .patch_status(&namespace, &cluster.name_any(), &status)
        .await
    {
        warn!(cluster = %cluster.name_any(), error = %e, "Failed to update LVMCluster status");
    }
}
