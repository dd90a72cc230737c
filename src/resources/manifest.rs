// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Manifest decoding into schema-less documents.
//!
//! A document is a [`DynamicObject`]: kind and apiVersion plus metadata and
//! an opaque payload. Input may be JSON text, YAML text (possibly
//! multi-document) or an already-built [`serde_json::Value`]. A document
//! without a resolvable kind is rejected here, before any network call.

use crate::error::{DockhandError, Result};
use kube::core::DynamicObject;
use serde::Deserialize;

/// Decode a single manifest from JSON or YAML text
pub fn decode(input: &str) -> Result<DynamicObject> {
    let mut docs = decode_all(input)?;
    if docs.len() != 1 {
        return Err(DockhandError::InvalidManifest(format!(
            "expected a single document, found {}",
            docs.len()
        )));
    }
    Ok(docs.remove(0))
}

/// Decode every document in a (possibly multi-document) manifest.
/// Empty documents are skipped; an input with no documents at all fails.
pub fn decode_all(input: &str) -> Result<Vec<DynamicObject>> {
    let mut docs = Vec::new();
    for document in serde_yaml::Deserializer::from_str(input) {
        let value = serde_json::Value::deserialize(document)
            .map_err(|e| DockhandError::InvalidManifest(format!("failed to parse manifest: {}", e)))?;
        if value.is_null() {
            continue;
        }
        docs.push(from_value(value)?);
    }
    if docs.is_empty() {
        return Err(DockhandError::InvalidManifest(
            "manifest contains no documents".to_string(),
        ));
    }
    Ok(docs)
}

/// Build a document from an in-memory value, validating that it carries a
/// kind and apiVersion
pub fn from_value(value: serde_json::Value) -> Result<DynamicObject> {
    let doc: DynamicObject = serde_json::from_value(value)
        .map_err(|e| DockhandError::InvalidManifest(format!("not a valid resource: {}", e)))?;
    match &doc.types {
        Some(t) if !t.kind.is_empty() && !t.api_version.is_empty() => Ok(doc),
        _ => Err(DockhandError::InvalidManifest(
            "kind and apiVersion are required".to_string(),
        )),
    }
}

/// Derive the registry identifier (`"Kind"` or `"Kind.group"`) from a
/// document's kind and apiVersion
pub fn kind_identifier(doc: &DynamicObject) -> Result<String> {
    let types = doc.types.as_ref().ok_or_else(|| {
        DockhandError::InvalidManifest("kind and apiVersion are required".to_string())
    })?;
    Ok(match types.api_version.split_once('/') {
        Some((group, _version)) => format!("{}.{}", types.kind, group),
        None => types.kind.clone(),
    })
}

/// The document's `metadata.name`, required for every CRUD operation that
/// addresses a single object
pub fn require_name(doc: &DynamicObject) -> Result<&str> {
    doc.metadata
        .name
        .as_deref()
        .ok_or_else(|| DockhandError::InvalidManifest("metadata.name is required".to_string()))
}
