// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod exec;
pub mod helpers;
pub mod kinds;
pub mod resources;
pub mod waiter;

#[cfg(test)]
pub(crate) mod test_utils;
