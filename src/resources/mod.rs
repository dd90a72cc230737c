// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Schema-less resource handling: kind resolution, manifest decoding and
//! generic document CRUD.

pub mod generic;
pub mod manifest;
pub mod registry;

pub use generic::Resources;
pub use registry::{Registry, ResolvedResource};
