// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fetching the children a workload references and listing the ones linked to it.

use crate::core::annotations::owns_link;
use crate::core::hash::ConfigObjectBinding;
use crate::core::ownership::Owner;
use crate::core::references::{ReferenceMetadata, ResolvedReferences};
use crate::error::{ChildError, ChildErrors, Result, RollerError};
use crate::kubernetes::ObjectStore;
use crate::types::{ConfigKind, ConfigObject};
use futures::future::join_all;
use tracing::{debug, instrument};

/// Get every ConfigMap and Secret the workload currently references.
///
/// All objects are fetched concurrently. A missing optional object is skipped,
/// a missing required one fails the whole fetch: either every child is
/// returned or none is.
#[instrument(skip(store, references), fields(references = references.len()))]
pub async fn get_current_children<S: ObjectStore>(
    store: &S,
    namespace: &str,
    references: &ResolvedReferences,
) -> Result<Vec<ConfigObjectBinding>> {
    let fetches = references
        .iter()
        .map(|(kind, name, metadata)| fetch_child(store, kind, namespace, name, metadata));

    let mut children = Vec::with_capacity(references.len());
    let mut errors = ChildErrors::default();
    for result in join_all(fetches).await {
        match result {
            Ok(Some(child)) => children.push(child),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    errors.into_result(RollerError::FetchChildren)?;
    Ok(children)
}

async fn fetch_child<S: ObjectStore>(
    store: &S,
    kind: ConfigKind,
    namespace: &str,
    name: &str,
    metadata: &ReferenceMetadata,
) -> std::result::Result<Option<ConfigObjectBinding>, ChildError> {
    match store.get_config(kind, namespace, name).await {
        Ok(Some(object)) => Ok(Some(ConfigObjectBinding {
            object,
            metadata: metadata.clone(),
        })),
        Ok(None) if !metadata.required => {
            debug!("Optional {} {}/{} not found, skipping", kind, namespace, name);
            Ok(None)
        }
        Ok(None) => Err(ChildError::new(
            kind,
            name,
            RollerError::NotFound {
                kind: kind.to_string(),
                namespace: namespace.to_string(),
                name: name.to_string(),
            },
        )),
        Err(e) => Err(ChildError::new(kind, name, e)),
    }
}

/// Get every ConfigMap and Secret in the namespace whose link belongs to the owner.
///
/// Both kinds are listed concurrently and every failing list is reported.
#[instrument(skip(store), fields(owner = %owner.name, kind = %owner.kind))]
pub async fn get_existing_children<S: ObjectStore>(
    store: &S,
    namespace: &str,
    owner: Owner<'_>,
) -> Result<Vec<ConfigObject>> {
    let lists = ConfigKind::ALL.map(|kind| async move {
        store
            .list_configs(kind, namespace)
            .await
            .map_err(|e| ChildError::new(kind, namespace, e))
    });

    let mut children = Vec::new();
    let mut errors = ChildErrors::default();
    for result in join_all(lists).await {
        match result {
            Ok(objects) => children.extend(
                objects
                    .into_iter()
                    .filter(|child| owns_link(child, owner.name, owner.kind)),
            ),
            Err(e) => errors.push(e),
        }
    }
    errors.into_result(RollerError::ListChildren)?;

    debug!("Found {} existing children", children.len());
    Ok(children)
}
