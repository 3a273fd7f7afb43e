// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! ConfigMaps and Secrets, the two kinds of configuration a workload can reference.

use k8s_openapi::api::core::v1::{ConfigMap, ObjectReference, Secret};
use kube::api::ObjectMeta;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigKind {
    ConfigMap,
    Secret,
}

impl ConfigKind {
    pub const ALL: [ConfigKind; 2] = [ConfigKind::ConfigMap, ConfigKind::Secret];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKind::ConfigMap => "ConfigMap",
            ConfigKind::Secret => "Secret",
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration object as read from the API server
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigObject {
    ConfigMap(ConfigMap),
    Secret(Secret),
}

impl ConfigObject {
    pub fn kind(&self) -> ConfigKind {
        match self {
            ConfigObject::ConfigMap(_) => ConfigKind::ConfigMap,
            ConfigObject::Secret(_) => ConfigKind::Secret,
        }
    }

    pub fn meta(&self) -> &ObjectMeta {
        match self {
            ConfigObject::ConfigMap(cm) => cm.meta(),
            ConfigObject::Secret(s) => s.meta(),
        }
    }

    pub fn meta_mut(&mut self) -> &mut ObjectMeta {
        match self {
            ConfigObject::ConfigMap(cm) => cm.meta_mut(),
            ConfigObject::Secret(s) => s.meta_mut(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            ConfigObject::ConfigMap(cm) => cm.name_any(),
            ConfigObject::Secret(s) => s.name_any(),
        }
    }

    pub fn namespace(&self) -> Option<String> {
        self.meta().namespace.clone()
    }

    /// Stable identity of the object, unlike the name it changes on re-creation
    pub fn uid(&self) -> Option<&str> {
        self.meta().uid.as_deref()
    }

    pub fn annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.meta().annotations.as_ref()
    }

    /// Reference used when publishing events about this object
    pub fn object_ref(&self) -> ObjectReference {
        match self {
            ConfigObject::ConfigMap(cm) => cm.object_ref(&()),
            ConfigObject::Secret(s) => s.object_ref(&()),
        }
    }

    /// `namespace/name` of the object, for log messages
    pub fn display_name(&self) -> String {
        format!("{}/{}", self.namespace().unwrap_or_default(), self.name())
    }
}

impl From<ConfigMap> for ConfigObject {
    fn from(cm: ConfigMap) -> Self {
        ConfigObject::ConfigMap(cm)
    }
}

impl From<Secret> for ConfigObject {
    fn from(s: Secret) -> Self {
        ConfigObject::Secret(s)
    }
}
