// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace-scoped convenience bundle for the common wait-and-exec flows.

use crate::constants::wait::POLL_INTERVAL;
use crate::error::Result;
use crate::exec::{self, ExecRequest, ExecResult};
use crate::kinds::{JobWaitOptions, Jobs, PodStatus, PodWaitOptions, Pods};
use crate::waiter::wait_for;
use k8s_openapi::api::core::v1::{Endpoints, Namespace};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::PostParams;
use kube::{Api, Client};
use std::time::Duration;

/// Helper functions bound to one namespace
#[derive(Clone)]
pub struct Helpers {
    client: Client,
    namespace: String,
}

impl Helpers {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Helpers {
            client,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Wait up to `timeout_secs` for the named pod to be running. Returns
    /// whether the state was reached; a failed pod is an error.
    pub async fn wait_pod_running(&self, name: &str, timeout_secs: u64) -> Result<bool> {
        Pods::new(self.client.clone())
            .wait(PodWaitOptions {
                name: name.to_string(),
                namespace: Some(self.namespace.clone()),
                status: PodStatus::Running,
                timeout: Duration::from_secs(timeout_secs),
            })
            .await
    }

    /// Wait up to `timeout_secs` for the named job to complete. Returns
    /// whether the state was reached; a failed job is an error.
    pub async fn wait_job_completed(&self, name: &str, timeout_secs: u64) -> Result<bool> {
        Jobs::new(self.client.clone())
            .wait(JobWaitOptions {
                name: name.to_string(),
                namespace: Some(self.namespace.clone()),
                timeout: Duration::from_secs(timeout_secs),
            })
            .await
    }

    /// Wait up to `timeout_secs` for the named service to have at least one
    /// endpoint address. Returns whether the service became ready; a service
    /// whose Endpoints object does not exist yet counts as not ready.
    pub async fn wait_service_ready(&self, service: &str, timeout_secs: u64) -> Result<bool> {
        let api: Api<Endpoints> = Api::namespaced(self.client.clone(), &self.namespace);
        wait_for(Duration::from_secs(timeout_secs), POLL_INTERVAL, || {
            let api = api.clone();
            let name = service.to_string();
            async move {
                match api.get_opt(&name).await? {
                    None => Ok(false),
                    Some(endpoints) => Ok(has_address(&endpoints)),
                }
            }
        })
        .await
    }

    /// Create a namespace whose name the server generates from the prefix
    /// (e.g. `"test-"` yields something like `"test-af8hx"`). Returns the
    /// generated name.
    pub async fn create_random_namespace(&self, prefix: &str) -> Result<String> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespace = Namespace {
            metadata: ObjectMeta {
                generate_name: Some(prefix.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let created = api.create(&PostParams::default(), &namespace).await?;
        Ok(created.metadata.name.unwrap_or_default())
    }

    /// Execute a non-interactive command in a pod in this namespace. Any
    /// namespace on the request is overridden by the helper's own.
    pub async fn exec_in_pod(&self, request: &ExecRequest) -> Result<ExecResult> {
        let request = ExecRequest {
            namespace: Some(self.namespace.clone()),
            ..request.clone()
        };
        exec::exec(&self.client, &request).await
    }
}

fn has_address(endpoints: &Endpoints) -> bool {
    endpoints.subsets.iter().flatten().any(|subset| {
        subset
            .addresses
            .as_ref()
            .is_some_and(|addresses| !addresses.is_empty())
    })
}
