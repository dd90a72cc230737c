// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed per-kind collections built on the generic CRUD layer.

pub mod collection;
pub mod jobs;
pub mod pods;

pub use collection::{ClusterCollection, NamespacedCollection};
pub use jobs::{JobOptions, JobWaitOptions, Jobs};
pub use pods::{ContainerOptions, PodOptions, PodStatus, PodWaitOptions, Pods};

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{
    ConfigMap, Namespace, Node, PersistentVolume, PersistentVolumeClaim, Secret, Service,
};
use k8s_openapi::api::networking::v1::Ingress;

pub type ConfigMaps = NamespacedCollection<ConfigMap>;
pub type Deployments = NamespacedCollection<Deployment>;
pub type Endpoints = NamespacedCollection<k8s_openapi::api::core::v1::Endpoints>;
pub type Ingresses = NamespacedCollection<Ingress>;
pub type PersistentVolumeClaims = NamespacedCollection<PersistentVolumeClaim>;
pub type Secrets = NamespacedCollection<Secret>;
pub type Services = NamespacedCollection<Service>;
pub type StatefulSets = NamespacedCollection<StatefulSet>;

pub type Namespaces = ClusterCollection<Namespace>;
pub type Nodes = ClusterCollection<Node>;
pub type PersistentVolumes = ClusterCollection<PersistentVolume>;
