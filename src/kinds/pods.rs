// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Pod collection: CRUD plus waiting, remote execution and ephemeral
//! container injection.

use crate::constants::{wait::POLL_INTERVAL, DEFAULT_NAMESPACE};
use crate::error::{DockhandError, Result};
use crate::exec::{self, ExecRequest, ExecResult};
use crate::kinds::collection::NamespacedCollection;
use crate::waiter::wait_for;
use k8s_openapi::api::core::v1::{
    Capabilities, Container, EphemeralContainer, Pod, PodSpec, SecurityContext,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{DeleteParams, Patch, PatchParams, PostParams};
use kube::{Api, Client};
use std::time::Duration;
use tracing::{debug, instrument};

/// Pod phases a caller may wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodStatus {
    Running,
    Succeeded,
}

impl PodStatus {
    fn as_str(&self) -> &'static str {
        match self {
            PodStatus::Running => "Running",
            PodStatus::Succeeded => "Succeeded",
        }
    }
}

/// Describes a single-container pod to be created
#[derive(Debug, Clone, Default)]
pub struct PodOptions {
    /// Namespace where the pod will run; the default namespace when unset
    pub namespace: Option<String>,
    /// Name of the pod and of its container
    pub name: String,
    /// Image executed by the pod's container
    pub image: String,
    /// Command executed by the pod's container, with its arguments
    pub command: Vec<String>,
    /// Pin the pod to a node
    pub node_name: Option<String>,
    /// Restart policy for the container; `Never` when unset
    pub restart_policy: Option<String>,
    /// When set, block until the pod has left `Pending`, up to this timeout
    pub wait: Option<Duration>,
}

/// Target state and deadline for [`Pods::wait`]
#[derive(Debug, Clone)]
pub struct PodWaitOptions {
    pub name: String,
    pub namespace: Option<String>,
    /// Phase to wait for
    pub status: PodStatus,
    pub timeout: Duration,
}

/// Describes an ephemeral container to inject into a running pod
#[derive(Debug, Clone, Default)]
pub struct ContainerOptions {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
    /// Capabilities added to the container's security context
    pub capabilities: Vec<String>,
    /// When set, block until the container reports a running state
    pub wait: Option<Duration>,
}

/// API for manipulating Pod resources within a Kubernetes cluster
#[derive(Clone)]
pub struct Pods {
    client: Client,
    inner: NamespacedCollection<Pod>,
}

impl Pods {
    pub fn new(client: Client) -> Self {
        Pods {
            inner: NamespacedCollection::new(client.clone()),
            client,
        }
    }

    fn api(&self, namespace: Option<&str>) -> Api<Pod> {
        self.inner.api(namespace)
    }

    /// Run a single-container pod described by the options. With `wait` set,
    /// blocks until the pod has left `Pending` and returns its fresh state.
    #[instrument(skip(self, options), fields(pod = %options.name))]
    pub async fn create(&self, options: PodOptions) -> Result<Pod> {
        let namespace = options.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE);
        let api = self.api(Some(namespace));
        let created = api
            .create(&PostParams::default(), &build_pod(&options))
            .await?;

        let Some(timeout) = options.wait else {
            return Ok(created);
        };
        debug!("Waiting up to {:?} for pod {} to start", timeout, options.name);
        let started = self.wait_started(&options.name, namespace, timeout).await?;
        if !started {
            return Err(DockhandError::Timeout(format!(
                "waiting for pod {} to be running",
                options.name
            )));
        }
        self.get(&options.name, Some(namespace)).await
    }

    pub async fn get(&self, name: &str, namespace: Option<&str>) -> Result<Pod> {
        self.inner.get(name, namespace).await
    }

    pub async fn list(&self, namespace: Option<&str>) -> Result<Vec<Pod>> {
        self.inner.list(namespace).await
    }

    pub async fn apply(&self, manifest_text: &str, namespace: Option<&str>) -> Result<Pod> {
        self.inner.apply(manifest_text, namespace).await
    }

    pub async fn delete(
        &self,
        name: &str,
        namespace: Option<&str>,
        params: &DeleteParams,
    ) -> Result<()> {
        self.inner.delete(name, namespace, params).await
    }

    /// Remove the named pod immediately (no grace period)
    pub async fn kill(&self, name: &str, namespace: Option<&str>) -> Result<()> {
        self.delete(name, namespace, &DeleteParams::default().grace_period(0))
            .await
    }

    /// Whether the named pod carries a deletion timestamp
    pub async fn is_terminating(&self, name: &str, namespace: Option<&str>) -> Result<bool> {
        let pod = self.get(name, namespace).await?;
        Ok(pod.metadata.deletion_timestamp.is_some())
    }

    /// Wait for the pod to reach the requested phase, polling until the
    /// timeout elapses. Returns whether the phase was reached; a `Failed`
    /// pod is an error, a pod that does not exist yet counts as pending.
    #[instrument(skip(self, options), fields(pod = %options.name))]
    pub async fn wait(&self, options: PodWaitOptions) -> Result<bool> {
        let api = self.api(options.namespace.as_deref());
        let name = options.name.clone();
        let target = options.status;
        wait_for(options.timeout, POLL_INTERVAL, || {
            let api = api.clone();
            let name = name.clone();
            async move {
                match api.get_opt(&name).await? {
                    None => Ok(false),
                    Some(pod) => pod_reached(&pod, target.as_str()),
                }
            }
        })
        .await
    }

    /// Wait until the pod has left `Pending`: `Running` for long-lived
    /// commands, `Succeeded` for ones that exit before the first poll.
    async fn wait_started(&self, name: &str, namespace: &str, timeout: Duration) -> Result<bool> {
        let api = self.api(Some(namespace));
        wait_for(timeout, POLL_INTERVAL, || {
            let api = api.clone();
            let name = name.to_string();
            async move {
                match api.get_opt(&name).await? {
                    None => Ok(false),
                    Some(pod) => match pod_phase(&pod) {
                        Some("Failed") => Err(DockhandError::PodFailed(name)),
                        Some("Running") | Some("Succeeded") => Ok(true),
                        _ => Ok(false),
                    },
                }
            }
        })
        .await
    }

    /// Execute a non-interactive command in one of the pod's containers
    pub async fn exec(&self, request: &ExecRequest) -> Result<ExecResult> {
        exec::exec(&self.client, request).await
    }

    /// Inject an ephemeral container into a running pod via the
    /// `ephemeralcontainers` subresource. With `wait` set on the options,
    /// blocks until the container reports a running state.
    #[instrument(skip(self, options), fields(pod = %name, container = %options.name))]
    pub async fn add_ephemeral_container(
        &self,
        name: &str,
        namespace: Option<&str>,
        options: ContainerOptions,
    ) -> Result<()> {
        let api = self.api(namespace);
        let pod = api.get(name).await?;

        let mut containers = pod
            .spec
            .as_ref()
            .and_then(|spec| spec.ephemeral_containers.clone())
            .unwrap_or_default();
        containers.push(build_ephemeral_container(&options));

        let patch = serde_json::json!({"spec": {"ephemeralContainers": containers}});
        let _updated: Pod = api
            .patch_subresource(
                "ephemeralcontainers",
                name,
                &PatchParams::default(),
                &Patch::Strategic(&patch),
            )
            .await?;

        let Some(timeout) = options.wait else {
            return Ok(());
        };
        debug!(
            "Waiting up to {:?} for ephemeral container {} to run",
            timeout, options.name
        );
        let running = wait_for(timeout, POLL_INTERVAL, || {
            let api = api.clone();
            let name = name.to_string();
            let container = options.name.clone();
            async move {
                match api.get_opt(&name).await? {
                    None => Err(DockhandError::NotFound(name)),
                    Some(pod) => Ok(ephemeral_container_running(&pod, &container)),
                }
            }
        })
        .await?;
        if !running {
            return Err(DockhandError::Timeout(format!(
                "waiting for ephemeral container {} in pod {}",
                options.name, name
            )));
        }
        Ok(())
    }
}

fn pod_phase(pod: &Pod) -> Option<&str> {
    pod.status.as_ref()?.phase.as_deref()
}

fn pod_reached(pod: &Pod, target: &str) -> Result<bool> {
    match pod_phase(pod) {
        Some("Failed") => Err(DockhandError::PodFailed(
            pod.metadata.name.clone().unwrap_or_default(),
        )),
        Some(phase) => Ok(phase == target),
        None => Ok(false),
    }
}

fn ephemeral_container_running(pod: &Pod, container: &str) -> bool {
    pod.status
        .as_ref()
        .and_then(|status| status.ephemeral_container_statuses.as_ref())
        .is_some_and(|statuses| {
            statuses.iter().any(|s| {
                s.name == container
                    && s.state
                        .as_ref()
                        .is_some_and(|state| state.running.is_some())
            })
        })
}

fn build_pod(options: &PodOptions) -> Pod {
    let container = Container {
        name: options.name.clone(),
        image: Some(options.image.clone()),
        command: Some(options.command.clone()),
        ..Default::default()
    };

    Pod {
        metadata: ObjectMeta {
            name: Some(options.name.clone()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![container],
            node_name: options.node_name.clone(),
            restart_policy: Some(
                options
                    .restart_policy
                    .clone()
                    .unwrap_or_else(|| "Never".to_string()),
            ),
            ..Default::default()
        }),
        status: None,
    }
}

fn build_ephemeral_container(options: &ContainerOptions) -> EphemeralContainer {
    let security_context = (!options.capabilities.is_empty()).then(|| SecurityContext {
        capabilities: Some(Capabilities {
            add: Some(options.capabilities.clone()),
            ..Default::default()
        }),
        ..Default::default()
    });

    EphemeralContainer {
        name: options.name.clone(),
        image: Some(options.image.clone()),
        command: Some(options.command.clone()),
        security_context,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{pod_json, MockService};
    use std::time::Duration;

    fn pods(mock: &MockService) -> Pods {
        Pods::new(mock.clone().into_client())
    }

    #[test]
    fn test_build_pod_synthesizes_single_container() {
        let pod = build_pod(&PodOptions {
            name: "runner".to_string(),
            image: "busybox".to_string(),
            command: vec!["sh".to_string(), "-c".to_string(), "sleep 300".to_string()],
            node_name: Some("node-1".to_string()),
            ..Default::default()
        });
        assert_eq!(pod.metadata.name.as_deref(), Some("runner"));
        let spec = pod.spec.unwrap();
        assert_eq!(spec.containers.len(), 1);
        assert_eq!(spec.containers[0].image.as_deref(), Some("busybox"));
        assert_eq!(spec.node_name.as_deref(), Some("node-1"));
        assert_eq!(spec.restart_policy.as_deref(), Some("Never"));
    }

    #[test]
    fn test_build_ephemeral_container_capabilities() {
        let container = build_ephemeral_container(&ContainerOptions {
            name: "debugger".to_string(),
            image: "busybox".to_string(),
            command: vec!["sh".to_string()],
            capabilities: vec!["NET_ADMIN".to_string()],
            wait: None,
        });
        let added = container
            .security_context
            .unwrap()
            .capabilities
            .unwrap()
            .add
            .unwrap();
        assert_eq!(added, vec!["NET_ADMIN".to_string()]);

        let plain = build_ephemeral_container(&ContainerOptions {
            name: "debugger".to_string(),
            image: "busybox".to_string(),
            ..Default::default()
        });
        assert!(plain.security_context.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_running_pod_is_satisfied() {
        let mock = MockService::new().on_get(
            "/api/v1/namespaces/default/pods/runner",
            200,
            &pod_json("runner", "default", "Running"),
        );
        let reached = pods(&mock)
            .wait(PodWaitOptions {
                name: "runner".to_string(),
                namespace: None,
                status: PodStatus::Running,
                timeout: Duration::from_secs(10),
            })
            .await
            .unwrap();
        assert!(reached);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_pending_pod_times_out() {
        let mock = MockService::new().on_get(
            "/api/v1/namespaces/default/pods/runner",
            200,
            &pod_json("runner", "default", "Pending"),
        );
        let reached = pods(&mock)
            .wait(PodWaitOptions {
                name: "runner".to_string(),
                namespace: None,
                status: PodStatus::Succeeded,
                timeout: Duration::from_secs(2),
            })
            .await
            .unwrap();
        assert!(!reached);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_failed_pod_is_an_error() {
        let mock = MockService::new().on_get(
            "/api/v1/namespaces/default/pods/runner",
            200,
            &pod_json("runner", "default", "Failed"),
        );
        let err = pods(&mock)
            .wait(PodWaitOptions {
                name: "runner".to_string(),
                namespace: None,
                status: PodStatus::Running,
                timeout: Duration::from_secs(10),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DockhandError::PodFailed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_missing_pod_counts_as_pending() {
        let mock = MockService::new();
        let reached = pods(&mock)
            .wait(PodWaitOptions {
                name: "runner".to_string(),
                namespace: None,
                status: PodStatus::Running,
                timeout: Duration::from_secs(2),
            })
            .await
            .unwrap();
        assert!(!reached);
    }

    #[tokio::test]
    async fn test_is_terminating() {
        let terminating = r#"{"apiVersion":"v1","kind":"Pod","metadata":{"name":"dying","namespace":"default","uid":"uid-dying","deletionTimestamp":"2026-02-01T10:00:00Z"},"status":{"phase":"Running"}}"#;
        let mock = MockService::new()
            .on_get("/api/v1/namespaces/default/pods/dying", 200, terminating)
            .on_get(
                "/api/v1/namespaces/default/pods/alive",
                200,
                &pod_json("alive", "default", "Running"),
            );
        let pods = pods(&mock);
        assert!(pods.is_terminating("dying", None).await.unwrap());
        assert!(!pods.is_terminating("alive", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_kill_uses_zero_grace_period() {
        let mock = MockService::new().on_delete(
            "/api/v1/namespaces/default/pods/runner",
            200,
            r#"{"kind":"Status","apiVersion":"v1","status":"Success"}"#,
        );
        pods(&mock).kill("runner", None).await.unwrap();
        assert_eq!(mock.count("DELETE", "/api/v1/namespaces/default/pods/runner"), 1);
    }

    #[tokio::test]
    async fn test_add_ephemeral_container_patches_subresource() {
        let mock = MockService::new()
            .on_get(
                "/api/v1/namespaces/default/pods/target",
                200,
                &pod_json("target", "default", "Running"),
            )
            .on_patch(
                "/api/v1/namespaces/default/pods/target/ephemeralcontainers",
                200,
                &pod_json("target", "default", "Running"),
            );
        pods(&mock)
            .add_ephemeral_container(
                "target",
                None,
                ContainerOptions {
                    name: "debugger".to_string(),
                    image: "busybox".to_string(),
                    command: vec!["sh".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            mock.count(
                "PATCH",
                "/api/v1/namespaces/default/pods/target/ephemeralcontainers"
            ),
            1
        );
    }

    #[tokio::test]
    async fn test_add_ephemeral_container_missing_pod_is_not_found() {
        let mock = MockService::new();
        let err = pods(&mock)
            .add_ephemeral_container("ghost", None, ContainerOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DockhandError::NotFound(_)));
    }

    #[test]
    fn test_ephemeral_container_running_predicate() {
        let with_running: Pod = serde_json::from_str(
            r#"{"apiVersion":"v1","kind":"Pod","metadata":{"name":"p"},"status":{"phase":"Running","ephemeralContainerStatuses":[{"name":"debugger","image":"busybox","imageID":"","restartCount":0,"ready":false,"state":{"running":{"startedAt":"2026-02-01T10:00:00Z"}}}]}}"#,
        )
        .unwrap();
        assert!(ephemeral_container_running(&with_running, "debugger"));
        assert!(!ephemeral_container_running(&with_running, "other"));
    }
}
