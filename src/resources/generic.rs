// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Generic document CRUD against any resource endpoint.
//!
//! Operations take schema-less documents and route them through an
//! [`Api<DynamicObject>`] built from the registry's endpoint descriptor, so
//! the same code path serves every kind the cluster knows about.

use crate::constants::{DEFAULT_NAMESPACE, FIELD_MANAGER};
use crate::error::Result;
use crate::resources::manifest;
use crate::resources::registry::{Registry, ResolvedResource};
use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::core::DynamicObject;
use kube::{Api, Client};
use tracing::{debug, instrument};

/// Generic operations over arbitrary resource kinds
#[derive(Clone)]
pub struct Resources {
    client: Client,
    registry: Registry,
}

impl Resources {
    pub fn new(client: Client, registry: Registry) -> Self {
        Resources { client, registry }
    }

    /// Build a dynamic Api for the resolved endpoint. Cluster-scoped
    /// endpoints ignore the namespace argument.
    fn api_for(&self, resolved: &ResolvedResource, namespace: Option<&str>) -> Api<DynamicObject> {
        if resolved.namespaced {
            Api::namespaced_with(
                self.client.clone(),
                namespace.unwrap_or(DEFAULT_NAMESPACE),
                &resolved.api_resource,
            )
        } else {
            Api::all_with(self.client.clone(), &resolved.api_resource)
        }
    }

    async fn resolve(&self, identifier: &str) -> Result<ResolvedResource> {
        self.registry.resolve(&self.client, identifier).await
    }

    /// Create the resource described by the document
    #[instrument(skip(self, doc))]
    pub async fn create(&self, doc: &DynamicObject) -> Result<DynamicObject> {
        let identifier = manifest::kind_identifier(doc)?;
        let resolved = self.resolve(&identifier).await?;
        let api = self.api_for(&resolved, doc.metadata.namespace.as_deref());
        debug!(
            "Creating {} {}",
            identifier,
            doc.metadata.name.as_deref().unwrap_or("<generated>")
        );
        Ok(api.create(&PostParams::default(), doc).await?)
    }

    /// Fetch a single object by kind, name and (for namespaced kinds) namespace
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        kind: &str,
        name: &str,
        namespace: Option<&str>,
    ) -> Result<DynamicObject> {
        let resolved = self.resolve(kind).await?;
        let api = self.api_for(&resolved, namespace);
        Ok(api.get(name).await?)
    }

    /// List every object of the kind; an empty collection is not an error
    #[instrument(skip(self))]
    pub async fn list(&self, kind: &str, namespace: Option<&str>) -> Result<Vec<DynamicObject>> {
        let resolved = self.resolve(kind).await?;
        let api = self.api_for(&resolved, namespace);
        let objects = api.list(&ListParams::default()).await?;
        Ok(objects.items)
    }

    /// Replace an existing object. The document must carry the
    /// resourceVersion observed at the last get or create; the server
    /// rejects stale versions with a conflict.
    #[instrument(skip(self, doc))]
    pub async fn update(&self, doc: &DynamicObject) -> Result<DynamicObject> {
        if doc
            .metadata
            .resource_version
            .as_deref()
            .is_none_or(str::is_empty)
        {
            return Err(crate::error::DockhandError::InvalidManifest(
                "resourceVersion is required for update".to_string(),
            ));
        }
        let identifier = manifest::kind_identifier(doc)?;
        let name = manifest::require_name(doc)?.to_string();
        let resolved = self.resolve(&identifier).await?;
        let api = self.api_for(&resolved, doc.metadata.namespace.as_deref());
        debug!("Updating {} {}", identifier, name);
        Ok(api.replace(&name, &PostParams::default(), doc).await?)
    }

    /// Delete an object. Returns once the server has accepted the request;
    /// it does not wait for the object to disappear.
    #[instrument(skip(self, params))]
    pub async fn delete(
        &self,
        kind: &str,
        name: &str,
        namespace: Option<&str>,
        params: &DeleteParams,
    ) -> Result<()> {
        let resolved = self.resolve(kind).await?;
        let api = self.api_for(&resolved, namespace);
        debug!("Deleting {} {}", kind, name);
        api.delete(name, params).await?;
        Ok(())
    }

    /// Upsert every document in a (possibly multi-document) manifest
    #[instrument(skip(self, manifest_text))]
    pub async fn apply(&self, manifest_text: &str) -> Result<Vec<DynamicObject>> {
        let docs = manifest::decode_all(manifest_text)?;
        let mut applied = Vec::with_capacity(docs.len());
        for doc in &docs {
            applied.push(self.apply_document(doc).await?);
        }
        Ok(applied)
    }

    /// Upsert a single document via server-side apply: created when absent,
    /// merged when present. Fields omitted from the document are left
    /// untouched on the server and the object's uid is preserved.
    #[instrument(skip(self, doc))]
    pub async fn apply_document(&self, doc: &DynamicObject) -> Result<DynamicObject> {
        let identifier = manifest::kind_identifier(doc)?;
        let name = manifest::require_name(doc)?.to_string();
        let resolved = self.resolve(&identifier).await?;
        let api = self.api_for(&resolved, doc.metadata.namespace.as_deref());
        debug!("Applying {} {}", identifier, name);
        let params = PatchParams::apply(FIELD_MANAGER).force();
        Ok(api.patch(&name, &params, &Patch::Apply(doc)).await?)
    }
}
