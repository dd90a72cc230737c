// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Job collection: CRUD plus completion waiting.

use crate::constants::{wait::POLL_INTERVAL, DEFAULT_NAMESPACE};
use crate::error::{DockhandError, Result};
use crate::kinds::collection::NamespacedCollection;
use crate::waiter::wait_for;
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client};
use std::time::Duration;
use tracing::{debug, instrument};

/// Describes a single-container job to be created
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    /// Namespace where the job will run; the default namespace when unset
    pub namespace: Option<String>,
    /// Name of the job and of its container
    pub name: String,
    /// Image executed by the job's container
    pub image: String,
    /// Command executed by the job's container, with its arguments
    pub command: Vec<String>,
    /// Pin the job's pod to a node
    pub node_name: Option<String>,
    /// Restart policy for the pod template; `Never` when unset
    pub restart_policy: Option<String>,
    /// When set, block until the job completes, up to this timeout
    pub wait: Option<Duration>,
    /// Let the server garbage-collect the job (and its pods) as soon as it
    /// finishes
    pub autodelete: bool,
}

/// Deadline for [`Jobs::wait`]
#[derive(Debug, Clone)]
pub struct JobWaitOptions {
    pub name: String,
    pub namespace: Option<String>,
    pub timeout: Duration,
}

/// API for manipulating Job resources within a Kubernetes cluster
#[derive(Clone)]
pub struct Jobs {
    inner: NamespacedCollection<Job>,
}

impl Jobs {
    pub fn new(client: Client) -> Self {
        Jobs {
            inner: NamespacedCollection::new(client),
        }
    }

    fn api(&self, namespace: Option<&str>) -> Api<Job> {
        self.inner.api(namespace)
    }

    /// Run a job described by the options. With `wait` set, blocks until the
    /// job's completion condition is true and returns its fresh state.
    #[instrument(skip(self, options), fields(job = %options.name))]
    pub async fn create(&self, options: JobOptions) -> Result<Job> {
        let namespace = options.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE);
        let api = self.api(Some(namespace));
        let created = api
            .create(&PostParams::default(), &build_job(&options))
            .await?;

        let Some(timeout) = options.wait else {
            return Ok(created);
        };
        debug!("Waiting up to {:?} for job {} to complete", timeout, options.name);
        let completed = self
            .wait(JobWaitOptions {
                name: options.name.clone(),
                namespace: Some(namespace.to_string()),
                timeout,
            })
            .await?;
        if !completed {
            return Err(DockhandError::Timeout(format!(
                "waiting for job {} to complete",
                options.name
            )));
        }
        self.get(&options.name, Some(namespace)).await
    }

    pub async fn get(&self, name: &str, namespace: Option<&str>) -> Result<Job> {
        self.inner.get(name, namespace).await
    }

    pub async fn list(&self, namespace: Option<&str>) -> Result<Vec<Job>> {
        self.inner.list(namespace).await
    }

    pub async fn apply(&self, manifest_text: &str, namespace: Option<&str>) -> Result<Job> {
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

    /// Remove the named job; cleanup of its pods is the server's
    /// responsibility
    pub async fn kill(&self, name: &str, namespace: Option<&str>) -> Result<()> {
        self.delete(name, namespace, &DeleteParams::default()).await
    }

    /// Wait for the job's completion condition, polling until the timeout
    /// elapses. Returns whether the job completed; a failed job is an
    /// error, a job that does not exist yet counts as pending.
    #[instrument(skip(self, options), fields(job = %options.name))]
    pub async fn wait(&self, options: JobWaitOptions) -> Result<bool> {
        let api = self.api(options.namespace.as_deref());
        let name = options.name.clone();
        wait_for(options.timeout, POLL_INTERVAL, || {
            let api = api.clone();
            let name = name.clone();
            async move {
                match api.get_opt(&name).await? {
                    None => Ok(false),
                    Some(job) => is_completed(&job),
                }
            }
        })
        .await
    }
}

/// Whether the job carries a true completion condition. A true `Failed`
/// condition is an error carrying the condition's reason.
pub(crate) fn is_completed(job: &Job) -> Result<bool> {
    let conditions = job
        .status
        .as_ref()
        .and_then(|status| status.conditions.as_ref());
    for condition in conditions.into_iter().flatten() {
        if condition.type_ == "Failed" && condition.status == "True" {
            return Err(DockhandError::JobFailed(
                condition.reason.clone().unwrap_or_default(),
            ));
        }
        if condition.type_ == "Complete" && condition.status == "True" {
            return Ok(true);
        }
    }
    Ok(false)
}

fn build_job(options: &JobOptions) -> Job {
    let container = Container {
        name: options.name.clone(),
        image: Some(options.image.clone()),
        command: Some(options.command.clone()),
        ..Default::default()
    };

    Job {
        metadata: ObjectMeta {
            name: Some(options.name.clone()),
            ..Default::default()
        },
        spec: Some(JobSpec {
            ttl_seconds_after_finished: options.autodelete.then_some(0),
            template: PodTemplateSpec {
                metadata: None,
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
            },
            ..Default::default()
        }),
        status: None,
    }
}
