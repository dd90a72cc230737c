// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;

/// Namespace used when a caller or manifest does not specify one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Field manager name used for server-side apply
pub const FIELD_MANAGER: &str = "dockhand";

/// Condition waiter configuration
pub mod wait {
    use super::Duration;

    /// Interval between successive polls of a waited-on object
    pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
}
