// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Ownership link and gate annotations.
//!
//! A ConfigMap or Secret is linked to a workload by an annotation whose key is
//! [`annotations::OWNER_PREFIX`] followed by the workload name, and whose value
//! is the workload kind. These links are the only record of which workload
//! depends on which configuration.

use crate::constants::annotations;
use crate::types::workload::WORKLOAD_KINDS;
use crate::types::{ConfigObject, Workload};
use kube::ResourceExt;
use std::collections::BTreeMap;

/// Build the ownership link annotation key for a workload name
pub fn owner_annotation_key(owner_name: &str) -> String {
    format!("{}{}", annotations::OWNER_PREFIX, owner_name)
}

/// Extract the workload name from an ownership link annotation key
pub fn owner_name_from_key(key: &str) -> Option<String> {
    key.strip_prefix(annotations::OWNER_PREFIX)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Names of every workload linked from the given annotations
pub fn owner_names(annotations: &BTreeMap<String, String>) -> Vec<String> {
    annotations
        .keys()
        .filter_map(|k| owner_name_from_key(k))
        .collect()
}

/// Value of the child's ownership link for the named workload
pub fn owner_link<'a>(child: &'a ConfigObject, owner_name: &str) -> Option<&'a str> {
    child
        .annotations()
        .and_then(|a| a.get(&owner_annotation_key(owner_name)))
        .map(String::as_str)
}

/// Check if the child carries a valid ownership link for the workload.
///
/// Any workload kind is accepted as value: workloads of different kinds with
/// the same name share one link key and must not keep overwriting it.
pub fn has_owner_link(child: &ConfigObject, owner_name: &str) -> bool {
    owner_link(child, owner_name).is_some_and(|v| WORKLOAD_KINDS.contains(&v))
}

/// Check if the owner's link on the child is its own to remove.
///
/// A link carrying another workload kind belongs to a workload of that kind
/// with the same name; only that workload may remove it. A value that is not
/// a workload kind is claimed by any owner with the name.
pub fn owns_link(child: &ConfigObject, owner_name: &str, owner_kind: &str) -> bool {
    owner_link(child, owner_name).is_some_and(|v| v == owner_kind || !WORKLOAD_KINDS.contains(&v))
}

/// Add or refresh the ownership link for the workload
pub fn set_owner_link(child: &mut ConfigObject, owner_name: &str, owner_kind: &str) {
    child
        .meta_mut()
        .annotations
        .get_or_insert_with(BTreeMap::new)
        .insert(owner_annotation_key(owner_name), owner_kind.to_string());
}

/// Remove the ownership link for the workload, returns whether one was present
pub fn remove_owner_link(child: &mut ConfigObject, owner_name: &str) -> bool {
    let key = owner_annotation_key(owner_name);
    child
        .meta_mut()
        .annotations
        .as_mut()
        .is_some_and(|a| a.remove(&key).is_some())
}

/// Check if the workload has the required annotation set to "true"
pub fn has_required_annotation<W: Workload>(workload: &W) -> bool {
    workload
        .annotations()
        .get(annotations::REQUIRED)
        .is_some_and(|v| v == annotations::REQUIRED_VALUE)
}
