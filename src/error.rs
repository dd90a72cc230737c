// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockhandError {
    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("timeout exceeded: {0}")]
    Timeout(String),

    #[error("exec failed: {0}")]
    ExecFailure(String),

    #[error("pod has failed: {0}")]
    PodFailed(String),

    #[error("job failed: {0}")]
    JobFailed(String),

    #[error("failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Kubernetes API error: {0}")]
    Kube(#[source] kube::Error),
}

/// Map Kubernetes API status codes onto the crate error taxonomy so callers
/// can branch on distinguishable error values.
impl From<kube::Error> for DockhandError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) => match resp.code {
                404 => DockhandError::NotFound(resp.message),
                409 if resp.reason == "AlreadyExists" => DockhandError::AlreadyExists(resp.message),
                409 => DockhandError::Conflict(resp.message),
                401 => DockhandError::Unauthorized(resp.message),
                403 => DockhandError::Forbidden(resp.message),
                _ => DockhandError::Kube(kube::Error::Api(resp)),
            },
            other => DockhandError::Kube(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, DockhandError>;
