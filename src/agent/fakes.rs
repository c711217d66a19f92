//! Test doubles for the environment and pod lookup ports

use crate::domain::ports::{EnvSourceRef, PodLookup};
use crate::error::{Error, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fake pod lookup returning a fixed pod or a failure
pub struct FakeLookup {
    pub pod: Option<Pod>,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeLookup {
    pub fn with_pod(pod: Pod) -> Self {
        Self {
            pod: Some(pod),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            pod: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PodLookup for FakeLookup {
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.pod.clone().ok_or_else(|| {
            Error::Internal(format!("pods \"{}\" not found in {}", name, namespace))
        })
    }
}

/// Operator pod with the given `(container, image)` pairs
pub fn operator_pod(containers: &[(&str, &str)]) -> Pod {
    Pod {
        spec: Some(PodSpec {
            containers: containers
                .iter()
                .map(|(name, image)| Container {
                    name: name.to_string(),
                    image: Some(image.to_string()),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// In-memory environment
pub fn env(vars: &[(&str, &str)]) -> EnvSourceRef {
    Arc::new(
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    )
}
