// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Shared CRUD plumbing for the typed per-kind collections.
//!
//! Every typed collection delegates to one of the two generic shapes here;
//! the per-kind modules only add option structs and kind-specific helpers.

use crate::constants::{DEFAULT_NAMESPACE, FIELD_MANAGER};
use crate::error::{DockhandError, Result};
use crate::resources::manifest;
use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::marker::PhantomData;

/// Decode a single-document manifest as kind `K`, rejecting text that
/// declares a different kind.
fn decode_typed<K>(manifest_text: &str) -> Result<(K, Option<String>, String)>
where
    K: Resource<DynamicType = ()> + DeserializeOwned,
{
    let doc = manifest::decode(manifest_text)?;
    let expected = K::kind(&());
    let found = doc.types.as_ref().map(|t| t.kind.as_str()).unwrap_or("");
    if found != expected.as_ref() {
        return Err(DockhandError::InvalidManifest(format!(
            "manifest is not a {}: found {}",
            expected, found
        )));
    }
    let name = manifest::require_name(&doc)?.to_string();
    let namespace = doc.metadata.namespace.clone();
    let obj: K = serde_json::from_value(serde_json::to_value(&doc).map_err(|e| {
        DockhandError::InvalidManifest(format!("failed to re-encode manifest: {}", e))
    })?)
    .map_err(|e| DockhandError::InvalidManifest(format!("not a valid {}: {}", expected, e)))?;
    Ok((obj, namespace, name))
}

/// CRUD over one namespaced kind
#[derive(Clone)]
pub struct NamespacedCollection<K> {
    client: Client,
    _kind: PhantomData<K>,
}

impl<K> NamespacedCollection<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + DeserializeOwned
        + Serialize
        + Debug,
{
    pub fn new(client: Client) -> Self {
        NamespacedCollection {
            client,
            _kind: PhantomData,
        }
    }

    pub(crate) fn api(&self, namespace: Option<&str>) -> Api<K> {
        Api::namespaced(
            self.client.clone(),
            namespace.unwrap_or(DEFAULT_NAMESPACE),
        )
    }

    /// Create the supplied object in the namespace
    pub async fn create(&self, obj: &K, namespace: Option<&str>) -> Result<K> {
        Ok(self.api(namespace).create(&PostParams::default(), obj).await?)
    }

    /// Fetch the named object from the namespace
    pub async fn get(&self, name: &str, namespace: Option<&str>) -> Result<K> {
        Ok(self.api(namespace).get(name).await?)
    }

    /// All objects of this kind in the namespace
    pub async fn list(&self, namespace: Option<&str>) -> Result<Vec<K>> {
        Ok(self.api(namespace).list(&ListParams::default()).await?.items)
    }

    /// Upsert from a single-document manifest; the text must declare this
    /// collection's kind. An explicit namespace argument overrides the
    /// manifest's own.
    pub async fn apply(&self, manifest_text: &str, namespace: Option<&str>) -> Result<K> {
        let (obj, doc_namespace, name) = decode_typed::<K>(manifest_text)?;
        let api = self.api(namespace.or(doc_namespace.as_deref()));
        let params = PatchParams::apply(FIELD_MANAGER).force();
        Ok(api.patch(&name, &params, &Patch::Apply(&obj)).await?)
    }

    /// Remove the named object from the namespace
    pub async fn delete(
        &self,
        name: &str,
        namespace: Option<&str>,
        params: &DeleteParams,
    ) -> Result<()> {
        self.api(namespace).delete(name, params).await?;
        Ok(())
    }
}

/// CRUD over one cluster-scoped kind
#[derive(Clone)]
pub struct ClusterCollection<K> {
    client: Client,
    _kind: PhantomData<K>,
}

impl<K> ClusterCollection<K>
where
    K: Resource<Scope = ClusterResourceScope, DynamicType = ()>
        + Clone
        + DeserializeOwned
        + Serialize
        + Debug,
{
    pub fn new(client: Client) -> Self {
        ClusterCollection {
            client,
            _kind: PhantomData,
        }
    }

    pub(crate) fn api(&self) -> Api<K> {
        Api::all(self.client.clone())
    }

    pub async fn create(&self, obj: &K) -> Result<K> {
        Ok(self.api().create(&PostParams::default(), obj).await?)
    }

    pub async fn get(&self, name: &str) -> Result<K> {
        Ok(self.api().get(name).await?)
    }

    pub async fn list(&self) -> Result<Vec<K>> {
        Ok(self.api().list(&ListParams::default()).await?.items)
    }

    pub async fn apply(&self, manifest_text: &str) -> Result<K> {
        let (obj, _, name) = decode_typed::<K>(manifest_text)?;
        let params = PatchParams::apply(FIELD_MANAGER).force();
        Ok(self.api().patch(&name, &params, &Patch::Apply(&obj)).await?)
    }

    pub async fn delete(&self, name: &str, params: &DeleteParams) -> Result<()> {
        self.api().delete(name, params).await?;
        Ok(())
    }
}
