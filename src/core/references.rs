// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resolution of the ConfigMaps and Secrets a pod template references.

use crate::types::{ConfigKind, Workload};
use k8s_openapi::api::core::v1::{Container, PodSpec};
use std::collections::{BTreeMap, BTreeSet};

/// What a workload needs from one referenced ConfigMap or Secret
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceMetadata {
    /// False only when every reference to the object is marked optional
    pub required: bool,
    /// The whole object is used, `keys` is irrelevant
    pub all_keys: bool,
    pub keys: BTreeSet<String>,
}

impl ReferenceMetadata {
    fn whole_object() -> Self {
        ReferenceMetadata {
            required: true,
            all_keys: true,
            keys: BTreeSet::new(),
        }
    }

    fn add_key(&mut self, key: &str, optional: Option<bool>) {
        if self.all_keys {
            return;
        }
        if !optional.unwrap_or(false) {
            self.required = true;
        }
        self.keys.insert(key.to_string());
    }
}

/// Referenced objects by name, one map per configuration kind
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedReferences {
    pub config_maps: BTreeMap<String, ReferenceMetadata>,
    pub secrets: BTreeMap<String, ReferenceMetadata>,
}

impl ResolvedReferences {
    pub fn get(&self, kind: ConfigKind) -> &BTreeMap<String, ReferenceMetadata> {
        match kind {
            ConfigKind::ConfigMap => &self.config_maps,
            ConfigKind::Secret => &self.secrets,
        }
    }

    fn get_mut(&mut self, kind: ConfigKind) -> &mut BTreeMap<String, ReferenceMetadata> {
        match kind {
            ConfigKind::ConfigMap => &mut self.config_maps,
            ConfigKind::Secret => &mut self.secrets,
        }
    }

    pub fn len(&self) -> usize {
        self.config_maps.len() + self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every reference as `(kind, name, metadata)`
    pub fn iter(&self) -> impl Iterator<Item = (ConfigKind, &String, &ReferenceMetadata)> {
        ConfigKind::ALL
            .into_iter()
            .flat_map(move |kind| self.get(kind).iter().map(move |(n, m)| (kind, n, m)))
    }

    fn add_whole_object(&mut self, kind: ConfigKind, name: &str) {
        self.get_mut(kind)
            .insert(name.to_string(), ReferenceMetadata::whole_object());
    }

    fn add_key(&mut self, kind: ConfigKind, name: &str, key: &str, optional: Option<bool>) {
        self.get_mut(kind)
            .entry(name.to_string())
            .or_default()
            .add_key(key, optional);
    }
}

/// Resolve the references of a workload's pod template
pub fn resolve_workload<W: Workload>(workload: &W) -> ResolvedReferences {
    workload
        .pod_template()
        .and_then(|t| t.spec.as_ref())
        .map(resolve_pod_spec)
        .unwrap_or_default()
}

/// Resolve the references of a pod spec.
///
/// Whole-object references (volumes and `envFrom`) are collected before
/// single-key references, so a key reference never narrows an object that is
/// also used as a whole.
pub fn resolve_pod_spec(spec: &PodSpec) -> ResolvedReferences {
    let mut refs = ResolvedReferences::default();
    let containers: Vec<&Container> = spec
        .init_containers
        .iter()
        .flatten()
        .chain(spec.containers.iter())
        .collect();

    for volume in spec.volumes.iter().flatten() {
        if let Some(cm) = &volume.config_map {
            refs.add_whole_object(ConfigKind::ConfigMap, &cm.name);
        }
        if let Some(name) = volume.secret.as_ref().and_then(|s| s.secret_name.as_ref()) {
            refs.add_whole_object(ConfigKind::Secret, name);
        }
        let projections = volume
            .projected
            .as_ref()
            .and_then(|p| p.sources.as_ref())
            .into_iter()
            .flatten();
        for projection in projections {
            if let Some(cm) = &projection.config_map {
                refs.add_whole_object(ConfigKind::ConfigMap, &cm.name);
            }
            if let Some(s) = &projection.secret {
                refs.add_whole_object(ConfigKind::Secret, &s.name);
            }
        }
    }

    for env_from in containers.iter().flat_map(|c| c.env_from.iter().flatten()) {
        if let Some(cm) = &env_from.config_map_ref {
            refs.add_whole_object(ConfigKind::ConfigMap, &cm.name);
        }
        if let Some(s) = &env_from.secret_ref {
            refs.add_whole_object(ConfigKind::Secret, &s.name);
        }
    }

    let value_sources = containers
        .iter()
        .flat_map(|c| c.env.iter().flatten())
        .filter_map(|env| env.value_from.as_ref());
    for source in value_sources {
        if let Some(cm) = &source.config_map_key_ref {
            refs.add_key(ConfigKind::ConfigMap, &cm.name, &cm.key, cm.optional);
        }
        if let Some(s) = &source.secret_key_ref {
            refs.add_key(ConfigKind::Secret, &s.name, &s.key, s.optional);
        }
    }

    refs
}
