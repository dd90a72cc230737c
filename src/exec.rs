// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Remote command execution inside a running container.
//!
//! One multiplexed stream is opened against the `pods/exec` subresource:
//! stdin is written fully and closed, stdout and stderr are drained into
//! independent buffers, and the terminal status frame carries the exit
//! code. The call blocks until the remote command terminates; any upper
//! bound on runtime is the caller's responsibility.

use crate::constants::DEFAULT_NAMESPACE;
use crate::error::{DockhandError, Result};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use kube::api::AttachParams;
use kube::{Api, Client};
use std::future::Future;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument};

/// The command to run and the target container
#[derive(Debug, Clone, Default)]
pub struct ExecRequest {
    /// Namespace where the pod is running
    pub namespace: Option<String>,
    /// Name of the pod to execute the command in
    pub pod: String,
    /// Name of the container to execute the command in; the pod's only
    /// container when unset
    pub container: Option<String>,
    /// Command to be executed with its parameters
    pub command: Vec<String>,
    /// Bytes supplied to the command on stdin; may be empty
    pub stdin: Vec<u8>,
}

/// Output collected from the execution of a command
#[derive(Debug, Clone)]
pub struct ExecResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Terminal status frame from the server, if one was delivered
    pub status: Option<Status>,
}

impl ExecResult {
    /// Whether the remote command exited successfully
    pub fn succeeded(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|s| s.status.as_deref() == Some("Success"))
    }

    /// The remote process exit code, when the server reported one
    pub fn exit_code(&self) -> Option<i32> {
        let status = self.status.as_ref()?;
        if status.status.as_deref() == Some("Success") {
            return Some(0);
        }
        status
            .details
            .as_ref()?
            .causes
            .as_ref()?
            .iter()
            .find(|cause| cause.reason.as_deref() == Some("ExitCode"))
            .and_then(|cause| cause.message.as_deref())
            .and_then(|message| message.parse().ok())
    }

    pub fn stdout_utf8(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_utf8(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Execute a non-interactive command in a running container and collect its
/// output. Fails with [`DockhandError::ExecFailure`] when the stream cannot
/// be established (missing pod or container, container not runnable).
#[instrument(skip(client, request), fields(pod = %request.pod))]
pub async fn exec(client: &Client, request: &ExecRequest) -> Result<ExecResult> {
    let namespace = request.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE);
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);

    let mut params = AttachParams::default()
        .stdin(true)
        .stdout(true)
        .stderr(true)
        .tty(false);
    if let Some(container) = &request.container {
        params = params.container(container.clone());
    }

    debug!("Executing {:?} in pod {}/{}", request.command, namespace, request.pod);

    let mut attached = pods
        .exec(&request.pod, request.command.clone(), &params)
        .await
        .map_err(|e| DockhandError::ExecFailure(format!("failed to establish exec stream: {}", e)))?;

    let mut stdin_writer = attached
        .stdin()
        .ok_or_else(|| DockhandError::ExecFailure("stdin stream unavailable".to_string()))?;
    let mut stdout_reader = attached
        .stdout()
        .ok_or_else(|| DockhandError::ExecFailure("stdout stream unavailable".to_string()))?;
    let mut stderr_reader = attached
        .stderr()
        .ok_or_else(|| DockhandError::ExecFailure("stderr stream unavailable".to_string()))?;
    let status_frame = attached.take_status();

    let result = drive_streams(
        stdin_writer,
        stdout_reader,
        stderr_reader,
        status_frame,
        &request.stdin,
    )
    .await?;

    attached
        .join()
        .await
        .map_err(|e| DockhandError::ExecFailure(format!("exec stream error: {}", e)))?;

    Ok(result)
}

/// Pump the attached streams: write the full input and close our side so the
/// remote command sees EOF, drain stdout and stderr concurrently, then
/// collect the terminal status frame.
async fn drive_streams<W, O, E, S>(
    mut stdin_writer: W,
    mut stdout_reader: O,
    mut stderr_reader: E,
    status_frame: Option<S>,
    input: &[u8],
) -> Result<ExecResult>
where
    W: AsyncWrite + Unpin,
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
    S: Future<Output = Option<Status>>,
{
    stdin_writer
        .write_all(input)
        .await
        .map_err(|e| DockhandError::ExecFailure(format!("failed writing stdin: {}", e)))?;
    stdin_writer
        .shutdown()
        .await
        .map_err(|e| DockhandError::ExecFailure(format!("failed closing stdin: {}", e)))?;
    drop(stdin_writer);

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    tokio::try_join!(
        stdout_reader.read_to_end(&mut stdout),
        stderr_reader.read_to_end(&mut stderr)
    )
    .map_err(|e| DockhandError::ExecFailure(format!("failed reading exec output: {}", e)))?;

    let status = match status_frame {
        Some(frame) => frame.await,
        None => None,
    };

    Ok(ExecResult {
        stdout,
        stderr,
        status,
    })
}
