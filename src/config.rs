// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubeconfig loading and client construction

use crate::error::{DockhandError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::PathBuf;
use tracing::debug;

/// Initialization settings for a [`Kubernetes`](crate::client::Kubernetes) instance
#[derive(Debug, Clone, Default)]
pub struct KubeConfig {
    /// Location of the cluster credentials file. When unset, the conventional
    /// per-user location (`$KUBECONFIG` or `~/.kube/config`) is used.
    pub config_path: Option<PathBuf>,
}

impl KubeConfig {
    /// Settings pointing at an explicit kubeconfig file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        KubeConfig {
            config_path: Some(path.into()),
        }
    }
}

/// Create a Kubernetes client from the configured kubeconfig file.
/// Each client owns its own connection pool; nothing is shared between instances.
pub async fn create_client(options: &KubeConfig) -> Result<Client> {
    let kubeconfig = match &options.config_path {
        Some(path) => {
            debug!("Loading kubeconfig from {}", path.display());
            Kubeconfig::read_from(path).map_err(|e| {
                DockhandError::KubeconfigError(format!(
                    "failed to read kubeconfig from {}: {}",
                    path.display(),
                    e
                ))
            })?
        }
        None => Kubeconfig::read()
            .map_err(|e| DockhandError::KubeconfigError(format!("failed to read kubeconfig: {}", e)))?,
    };

    let client_config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| DockhandError::KubeconfigError(format!("failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| DockhandError::KubeconfigError(format!("failed to create client: {}", e)))
}
