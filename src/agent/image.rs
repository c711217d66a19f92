//! Agent Image Resolution
//!
//! The agent ships in the same image as the operator. The image is taken from
//! `AGENT_IMAGE` when set, otherwise it is copied from the operator container
//! of the operator's own running pod.

use crate::config::{OperatorConfig, AGENT_IMAGE_ENV, POD_NAME_ENV};
use crate::domain::ports::{EnvSourceRef, PodLookupRef};
use crate::error::{Error, Result};
use std::time::Duration;
use tracing::debug;

/// Resolves the container image of the agent
#[derive(Clone)]
pub struct ImageResolver {
    env: EnvSourceRef,
    lookup: PodLookupRef,
    namespace: String,
    container_name: String,
    timeout: Duration,
}

impl ImageResolver {
    /// Create a resolver scoped to the operator namespace in `config`
    pub fn new(config: &OperatorConfig, env: EnvSourceRef, lookup: PodLookupRef) -> Self {
        Self {
            env,
            lookup,
            namespace: config.namespace.clone(),
            container_name: config.operator_container_name.clone(),
            timeout: config.lookup_timeout,
        }
    }

    /// Resolve the agent image
    pub async fn resolve(&self) -> Result<String> {
        if let Some(image) = self.env.var(AGENT_IMAGE_ENV) {
            debug!(image = %image, "Using agent image from {}", AGENT_IMAGE_ENV);
            return Ok(image);
        }

        let pod_name = self
            .env
            .var(POD_NAME_ENV)
            .ok_or_else(|| Error::MissingEnvironmentValue {
                name: POD_NAME_ENV.to_string(),
            })?;

        self.running_pod_image(&pod_name).await
    }

    async fn running_pod_image(&self, pod_name: &str) -> Result<String> {
        let lookup_failed = |source: Error| Error::SelfLookupFailed {
            pod: pod_name.to_string(),
            namespace: self.namespace.clone(),
            source: Box::new(source),
        };

        let fetch = self.lookup.get_pod(&self.namespace, pod_name);
        let pod = tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| lookup_failed(Error::Timeout(self.timeout)))?
            .map_err(lookup_failed)?;

        let image = pod
            .spec
            .iter()
            .flat_map(|spec| spec.containers.iter())
            .find(|c| c.name == self.container_name)
            .and_then(|c| c.image.clone())
            .filter(|image| !image.is_empty())
            .ok_or_else(|| Error::ContainerNotFound {
                container: self.container_name.clone(),
                pod: pod_name.to_string(),
            })?;

        debug!(
            pod = %pod_name,
            namespace = %self.namespace,
            image = %image,
            "Resolved agent image from running operator pod"
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::fakes::{env, operator_pod, FakeLookup};
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn resolver(env: EnvSourceRef, lookup: Arc<FakeLookup>) -> ImageResolver {
        ImageResolver::new(&OperatorConfig::default(), env, lookup)
    }

    #[tokio::test]
    async fn test_override_skips_lookup() {
        let lookup = Arc::new(FakeLookup::failing());
        let vars = env(&[("AGENT_IMAGE", "X"), ("POD_NAME", "op-123")]);
        let resolver = resolver(vars, lookup.clone());

        assert_eq!(resolver.resolve().await.unwrap(), "X");
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_pod_name() {
        let lookup = Arc::new(FakeLookup::failing());
        let resolver = resolver(env(&[("AGENT_IMAGE", "")]), lookup.clone());

        let err = resolver.resolve().await.unwrap_err();
        assert_matches!(err, Error::MissingEnvironmentValue { ref name } if name == "POD_NAME");
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_image_from_running_pod() {
        let pod = operator_pod(&[
            ("kube-rbac-proxy", "registry/proxy:v1"),
            ("manager", "registry/x:tag"),
        ]);
        let lookup = Arc::new(FakeLookup::with_pod(pod));
        let resolver = resolver(env(&[("POD_NAME", "op-123")]), lookup.clone());

        assert_eq!(resolver.resolve().await.unwrap(), "registry/x:tag");
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_container_not_found() {
        let pod = operator_pod(&[("sidecar", "registry/sidecar:v1")]);
        let lookup = Arc::new(FakeLookup::with_pod(pod));
        let resolver = resolver(env(&[("POD_NAME", "op-123")]), lookup);

        let err = resolver.resolve().await.unwrap_err();
        assert_matches!(
            err,
            Error::ContainerNotFound { ref container, ref pod }
                if container == "manager" && pod == "op-123"
        );
    }

    #[tokio::test]
    async fn test_lookup_failure_names_pod_and_namespace() {
        let lookup = Arc::new(FakeLookup::failing());
        let resolver = resolver(env(&[("POD_NAME", "op-123")]), lookup);

        let err = resolver.resolve().await.unwrap_err();
        assert_matches!(
            err,
            Error::SelfLookupFailed { ref pod, ref namespace, ref source }
                if pod == "op-123"
                    && namespace == "openshift-storage"
                    && matches!(**source, Error::Internal(_))
        );
    }

    #[tokio::test]
    async fn test_lookup_timeout() {
        let lookup = FakeLookup {
            pod: Some(operator_pod(&[("manager", "registry/x:tag")])),
            delay: Some(Duration::from_secs(30)),
            calls: AtomicUsize::new(0),
        };
        let config = OperatorConfig::default().with_lookup_timeout(Duration::from_millis(50));
        let vars = env(&[("POD_NAME", "op-123")]);
        let resolver = ImageResolver::new(&config, vars, Arc::new(lookup));

        let err = resolver.resolve().await.unwrap_err();
        assert_matches!(
            err,
            Error::SelfLookupFailed { ref source, .. } if matches!(**source, Error::Timeout(_))
        );
    }
}
