// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use http::{Request, Response};
use kube::client::Body;
use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request
/// method and path, and records every request it serves.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for PUT requests matching the exact path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Add a response for PATCH requests matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    /// Add a response for DELETE requests matching the exact path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Add the API discovery fixtures: a core group with the common kinds
    /// and a `batch` group with jobs
    pub fn with_discovery(self) -> Self {
        self.on_get("/apis", 200, APIS_JSON)
            .on_get("/api", 200, API_VERSIONS_JSON)
            .on_get("/api/v1", 200, CORE_V1_JSON)
            .on_get("/apis/batch/v1", 200, BATCH_V1_JSON)
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// Number of recorded requests with this method and exact path
    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, p)| m == method && p == path)
            .count()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));
        let response = self.find_response(&method, &path);

        Box::pin(async move {
            match response {
                Some((status, body)) => Ok(Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(Body::from(body.into_bytes()))
                    .unwrap()),
                None => {
                    // Default 404 for unmatched requests
                    let body = r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#;
                    Ok(Response::builder()
                        .status(404)
                        .header("content-type", "application/json")
                        .body(Body::from(body.as_bytes().to_vec()))
                        .unwrap())
                }
            }
        })
    }
}

const APIS_JSON: &str = r#"{
  "kind": "APIGroupList",
  "apiVersion": "v1",
  "groups": [
    {
      "name": "batch",
      "versions": [{"groupVersion": "batch/v1", "version": "v1"}],
      "preferredVersion": {"groupVersion": "batch/v1", "version": "v1"}
    },
    {
      "name": "apps",
      "versions": [{"groupVersion": "apps/v1", "version": "v1"}],
      "preferredVersion": {"groupVersion": "apps/v1", "version": "v1"}
    }
  ]
}"#;

const API_VERSIONS_JSON: &str = r#"{"kind":"APIVersions","versions":["v1"]}"#;

const CORE_V1_JSON: &str = r#"{
  "kind": "APIResourceList",
  "groupVersion": "v1",
  "resources": [
    {"name": "pods", "singularName": "pod", "namespaced": true, "kind": "Pod",
     "verbs": ["create", "delete", "get", "list", "patch", "update", "watch"]},
    {"name": "services", "singularName": "service", "namespaced": true, "kind": "Service",
     "verbs": ["create", "delete", "get", "list", "patch", "update", "watch"]},
    {"name": "configmaps", "singularName": "configmap", "namespaced": true, "kind": "ConfigMap",
     "verbs": ["create", "delete", "get", "list", "patch", "update", "watch"]},
    {"name": "namespaces", "singularName": "namespace", "namespaced": false, "kind": "Namespace",
     "verbs": ["create", "delete", "get", "list", "patch", "update", "watch"]},
    {"name": "persistentvolumes", "singularName": "persistentvolume", "namespaced": false, "kind": "PersistentVolume",
     "verbs": ["create", "delete", "get", "list", "patch", "update", "watch"]}
  ]
}"#;

const BATCH_V1_JSON: &str = r#"{
  "kind": "APIResourceList",
  "groupVersion": "batch/v1",
  "resources": [
    {"name": "jobs", "singularName": "job", "namespaced": true, "kind": "Job",
     "verbs": ["create", "delete", "get", "list", "patch", "update", "watch"]}
  ]
}"#;

/// A pod JSON response in the given phase
pub fn pod_json(name: &str, namespace: &str, phase: &str) -> String {
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("uid-{}", name),
            "resourceVersion": "1"
        },
        "spec": {
            "containers": [{"name": name, "image": "busybox"}]
        },
        "status": {"phase": phase}
    })
    .to_string()
}

/// A job JSON response, optionally carrying one status condition
pub fn job_json(name: &str, namespace: &str, condition: Option<(&str, &str)>) -> String {
    let conditions: Vec<serde_json::Value> = condition
        .into_iter()
        .map(|(type_, status)| {
            serde_json::json!({"type": type_, "status": status, "reason": "JobReason"})
        })
        .collect();
    serde_json::json!({
        "apiVersion": "batch/v1",
        "kind": "Job",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("uid-{}", name),
            "resourceVersion": "1"
        },
        "spec": {},
        "status": {"conditions": conditions}
    })
    .to_string()
}
