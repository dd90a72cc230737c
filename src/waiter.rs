// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Polling-based condition waiting.
//!
//! The waiter re-probes the target at a fixed interval until the probe
//! reports satisfaction, the deadline elapses, or the probe fails. Timing
//! out is an ordinary outcome (`Ok(false)`), never an error; callers branch
//! on the boolean. Dropping the returned future cancels the wait and any
//! in-flight probe with it, so no polling activity survives the call.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Poll `probe` every `interval` until it returns `Ok(true)` or `deadline`
/// elapses. Probe errors abort the wait and propagate.
pub async fn wait_for<F, Fut>(deadline: Duration, interval: Duration, mut probe: F) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let polling = async {
        loop {
            if probe().await? {
                return Ok(true);
            }
            sleep(interval).await;
        }
    };

    match timeout(deadline, polling).await {
        Ok(outcome) => outcome,
        Err(_elapsed) => Ok(false),
    }
}
