// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Capability contract shared by the workload kinds Roller reconciles.

use crate::constants::annotations;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::PodTemplateSpec;
use k8s_openapi::NamespaceResourceScope;
use kube::{Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Kinds of the workloads Roller reconciles, the values an ownership link can carry
pub const WORKLOAD_KINDS: [&str; 3] = ["Deployment", "StatefulSet", "DaemonSet"];

/// A workload that embeds a pod template.
///
/// Annotations and finalizers are reached through [`ResourceExt`], a deep copy
/// is a `clone()` and desired-state comparison is structural (`PartialEq`).
pub trait Workload:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + PartialEq
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// The embedded pod template, if the workload has a spec
    fn pod_template(&self) -> Option<&PodTemplateSpec>;

    /// Mutable access to the pod template, creating an empty spec when missing
    fn pod_template_mut(&mut self) -> &mut PodTemplateSpec;

    /// The workload kind, e.g. `Deployment`
    fn workload_kind() -> String {
        Self::kind(&()).to_string()
    }

    /// Check whether the workload has a deletion timestamp
    fn is_marked_for_deletion(&self) -> bool {
        self.meta().deletion_timestamp.is_some()
    }

    /// The config hash currently stored on the pod template
    fn config_hash(&self) -> Option<&str> {
        self.pod_template()
            .and_then(|t| t.metadata.as_ref())
            .and_then(|m| m.annotations.as_ref())
            .and_then(|a| a.get(annotations::CONFIG_HASH))
            .map(String::as_str)
    }

    /// Store the config hash on the pod template
    fn set_config_hash(&mut self, hash: &str) {
        self.pod_template_mut()
            .metadata
            .get_or_insert_with(Default::default)
            .annotations
            .get_or_insert_with(Default::default)
            .insert(annotations::CONFIG_HASH.to_string(), hash.to_string());
    }

    /// `namespace/name` of the workload, for log messages
    fn display_name(&self) -> String {
        format!("{}/{}", self.namespace().unwrap_or_default(), self.name_any())
    }
}

impl Workload for Deployment {
    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|s| &s.template)
    }

    fn pod_template_mut(&mut self) -> &mut PodTemplateSpec {
        &mut self.spec.get_or_insert_with(Default::default).template
    }
}

impl Workload for StatefulSet {
    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|s| &s.template)
    }

    fn pod_template_mut(&mut self) -> &mut PodTemplateSpec {
        &mut self.spec.get_or_insert_with(Default::default).template
    }
}

impl Workload for DaemonSet {
    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|s| &s.template)
    }

    fn pod_template_mut(&mut self) -> &mut PodTemplateSpec {
        &mut self.spec.get_or_insert_with(Default::default).template
    }
}
