// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Content hash of the configuration a workload uses.
//!
//! The hash covers the names of the referenced objects and the data in scope
//! for each of them: the full data map for whole-object references, only the
//! referenced keys otherwise. Metadata never takes part, and maps are ordered
//! so the result does not depend on the order children were fetched in.

use crate::core::references::ReferenceMetadata;
use crate::error::Result;
use crate::types::ConfigObject;
use k8s_openapi::ByteString;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// A fetched ConfigMap or Secret together with what the workload needs from it
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigObjectBinding {
    pub object: ConfigObject,
    pub metadata: ReferenceMetadata,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct HashSource {
    config_maps: BTreeMap<String, BTreeMap<String, String>>,
    secrets: BTreeMap<String, BTreeMap<String, ByteString>>,
}

/// Calculate the hex encoded SHA-256 hash of the in-scope configuration
pub fn calculate_config_hash<'a, I>(children: I) -> Result<String>
where
    I: IntoIterator<Item = &'a ConfigObjectBinding>,
{
    let mut source = HashSource::default();

    // All children live in the workload's namespace, so names are unique per kind
    for child in children {
        match &child.object {
            ConfigObject::ConfigMap(cm) => {
                source.config_maps.insert(
                    child.object.name(),
                    in_scope_data(cm.data.as_ref(), &child.metadata),
                );
            }
            ConfigObject::Secret(s) => {
                source.secrets.insert(
                    child.object.name(),
                    in_scope_data(s.data.as_ref(), &child.metadata),
                );
            }
        }
    }

    let bytes = serde_json::to_vec(&source)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

fn in_scope_data<V: Clone>(
    data: Option<&BTreeMap<String, V>>,
    metadata: &ReferenceMetadata,
) -> BTreeMap<String, V> {
    let Some(data) = data else {
        return BTreeMap::new();
    };

    if metadata.all_keys {
        return data.clone();
    }

    metadata
        .keys
        .iter()
        .filter_map(|key| data.get(key).map(|value| (key.clone(), value.clone())))
        .collect()
}
