// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource kind resolution against cluster API discovery.
//!
//! A kind identifier is either `"<Kind>"` for the core group (`"Pod"`,
//! `"Service"`, ...) or `"<Kind>.<group>"` for everything else
//! (`"Job.batch"`, `"Ingress.networking.k8s.io"`). Resolution hits API
//! discovery once per distinct identifier and caches the result for the
//! lifetime of the process.

use crate::error::{DockhandError, Result};
use kube::discovery::{ApiResource, Discovery, Scope};
use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

/// A kind resolved to its concrete API endpoint: group, version, plural
/// resource name and scope.
#[derive(Clone, Debug)]
pub struct ResolvedResource {
    pub api_resource: ApiResource,
    pub namespaced: bool,
}

/// Memoizing kind-to-endpoint lookup, shared by every client in the process.
///
/// The map itself is guarded by a plain mutex held only long enough to hand
/// out a per-identifier cell; the cell serializes first-time discovery so
/// concurrent resolvers of the same identifier trigger exactly one
/// round-trip and observe the same descriptor.
#[derive(Clone, Default)]
pub struct Registry {
    cells: Arc<Mutex<HashMap<String, Arc<OnceCell<ResolvedResource>>>>>,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// The process-wide registry instance
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    /// Resolve a kind identifier to its endpoint descriptor, consulting the
    /// cache first. Fails with [`DockhandError::UnknownKind`] when the
    /// cluster's API surface has no matching endpoint.
    #[instrument(skip(self, client))]
    pub async fn resolve(&self, client: &Client, identifier: &str) -> Result<ResolvedResource> {
        let cell = {
            let mut cells = self.cells.lock().expect("registry cache lock poisoned");
            Arc::clone(cells.entry(identifier.to_string()).or_default())
        };
        // A failed discovery leaves the cell empty, so the next caller retries.
        cell.get_or_try_init(|| discover(client, identifier))
            .await
            .cloned()
    }
}

/// Split an identifier into kind and API group. A bare kind belongs to the
/// legacy/core group, whose discovery name is the empty string.
fn parse_identifier(identifier: &str) -> (&str, &str) {
    match identifier.split_once('.') {
        Some((kind, group)) => (kind, group),
        None => (identifier, ""),
    }
}

async fn discover(client: &Client, identifier: &str) -> Result<ResolvedResource> {
    let (kind, group) = parse_identifier(identifier);

    let discovery = Discovery::new(client.clone())
        .filter(&[group])
        .run()
        .await?;

    for api_group in discovery.groups() {
        if api_group.name() != group {
            continue;
        }
        if let Some((api_resource, capabilities)) = api_group.recommended_kind(kind) {
            debug!(
                "Resolved kind {} to {}/{} ({})",
                identifier,
                api_resource.api_version,
                api_resource.plural,
                if capabilities.scope == Scope::Namespaced {
                    "namespaced"
                } else {
                    "cluster-scoped"
                }
            );
            return Ok(ResolvedResource {
                api_resource,
                namespaced: capabilities.scope == Scope::Namespaced,
            });
        }
    }

    Err(DockhandError::UnknownKind(identifier.to_string()))
}
