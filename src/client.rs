// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client entry point: one instance per execution context, combining the
//! generic document surface with the typed per-kind collections.

use crate::config::{self, KubeConfig};
use crate::constants::DEFAULT_NAMESPACE;
use crate::error::Result;
use crate::helpers::Helpers;
use crate::kinds::{
    ConfigMaps, Deployments, Endpoints, Ingresses, Jobs, Namespaces, Nodes,
    PersistentVolumeClaims, PersistentVolumes, Pods, Secrets, Services, StatefulSets,
};
use crate::resources::{Registry, Resources};
use kube::api::DeleteParams;
use kube::core::DynamicObject;
use kube::Client;

/// A synchronous-from-the-caller's-view handle to one Kubernetes cluster.
///
/// Each instance owns its own connection pool; the only state shared between
/// instances is the process-wide kind-resolution cache.
#[derive(Clone)]
pub struct Kubernetes {
    client: Client,
    resources: Resources,
}

impl Kubernetes {
    /// Connect using the kubeconfig file named by the options (or the
    /// conventional per-user location)
    pub async fn new(options: &KubeConfig) -> Result<Self> {
        let client = config::create_client(options).await?;
        Ok(Kubernetes::from_client(client))
    }

    /// Wrap a pre-built client. Used by tests to inject a fake API server.
    pub fn from_client(client: Client) -> Self {
        Kubernetes::with_registry(client, Registry::global().clone())
    }

    /// Wrap a pre-built client with its own kind-resolution cache
    pub fn with_registry(client: Client, registry: Registry) -> Self {
        Kubernetes {
            resources: Resources::new(client.clone(), registry),
            client,
        }
    }

    /// The generic document surface
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    // Generic surface, resolving kinds through the registry.

    pub async fn create(&self, doc: &DynamicObject) -> Result<DynamicObject> {
        self.resources.create(doc).await
    }

    pub async fn get(
        &self,
        kind: &str,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<DynamicObject> {
        self.resources.get(kind, name, namespace).await
    }

    pub async fn list(&self, kind: &str, namespace: Option<&str>) -> Result<Vec<DynamicObject>> {
        self.resources.list(kind, namespace).await
    }

    pub async fn update(&self, doc: &DynamicObject) -> Result<DynamicObject> {
        self.resources.update(doc).await
    }

    pub async fn delete(&self, kind: &str, name: &str, namespace: Option<&str>) -> Result<()> {
        self.resources
            .delete(kind, name, namespace, &DeleteParams::default())
            .await
    }

    /// Upsert every document of a (possibly multi-document) manifest
    pub async fn apply(&self, manifest_text: &str) -> Result<Vec<DynamicObject>> {
        self.resources.apply(manifest_text).await
    }

    // Typed per-kind collections.

    pub fn pods(&self) -> Pods {
        Pods::new(self.client.clone())
    }

    pub fn jobs(&self) -> Jobs {
        Jobs::new(self.client.clone())
    }

    pub fn configmaps(&self) -> ConfigMaps {
        ConfigMaps::new(self.client.clone())
    }

    pub fn deployments(&self) -> Deployments {
        Deployments::new(self.client.clone())
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(self.client.clone())
    }

    pub fn ingresses(&self) -> Ingresses {
        Ingresses::new(self.client.clone())
    }

    pub fn namespaces(&self) -> Namespaces {
        Namespaces::new(self.client.clone())
    }

    pub fn nodes(&self) -> Nodes {
        Nodes::new(self.client.clone())
    }

    pub fn persistent_volumes(&self) -> PersistentVolumes {
        PersistentVolumes::new(self.client.clone())
    }

    pub fn persistent_volume_claims(&self) -> PersistentVolumeClaims {
        PersistentVolumeClaims::new(self.client.clone())
    }

    pub fn secrets(&self) -> Secrets {
        Secrets::new(self.client.clone())
    }

    pub fn services(&self) -> Services {
        Services::new(self.client.clone())
    }

    pub fn statefulsets(&self) -> StatefulSets {
        StatefulSets::new(self.client.clone())
    }

    /// Helpers bound to the default namespace
    pub fn helpers(&self) -> Helpers {
        Helpers::new(self.client.clone(), DEFAULT_NAMESPACE)
    }

    /// Helpers bound to the given namespace
    pub fn namespaced_helpers(&self, namespace: &str) -> Helpers {
        Helpers::new(self.client.clone(), namespace)
    }
}
