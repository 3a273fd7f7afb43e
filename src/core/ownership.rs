// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Keeping ownership links on children in line with what the workload references.

use crate::constants::reasons;
use crate::core::annotations::{has_owner_link, remove_owner_link, set_owner_link};
use crate::core::hash::ConfigObjectBinding;
use crate::error::{ChildError, ChildErrors, Result, RollerError};
use crate::kubernetes::{EventPublisher, ObjectStore};
use crate::types::{ConfigKind, ConfigObject};
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// The workload a set of children belongs to
#[derive(Clone, Copy, Debug)]
pub struct Owner<'a> {
    pub name: &'a str,
    pub kind: &'a str,
}

/// Link every current child to the owner, then unlink the orphans.
///
/// Links are added concurrently and each child is updated on its own: when
/// some updates fail the others stay committed and every failure is reported
/// together. Orphans are only handled once all links are in place.
#[instrument(skip_all, fields(owner = %owner.name, kind = %owner.kind))]
pub async fn update_owner_references<S, E>(
    store: &S,
    events: &E,
    owner: Owner<'_>,
    existing: Vec<ConfigObject>,
    current: &[ConfigObjectBinding],
) -> Result<()>
where
    S: ObjectStore,
    E: EventPublisher,
{
    let updates = current
        .iter()
        .map(|child| add_owner_reference(store, events, owner, &child.object));
    let errors: ChildErrors = join_all(updates)
        .await
        .into_iter()
        .filter_map(|r| r.err())
        .collect();
    errors.into_result(RollerError::UpdateChildren)?;

    let orphans = get_orphans(existing, current);
    remove_owner_references(store, events, owner.name, orphans).await
}

async fn add_owner_reference<S, E>(
    store: &S,
    events: &E,
    owner: Owner<'_>,
    child: &ConfigObject,
) -> std::result::Result<(), ChildError>
where
    S: ObjectStore,
    E: EventPublisher,
{
    if has_owner_link(child, owner.name) {
        return Ok(());
    }

    let mut updated = child.clone();
    set_owner_link(&mut updated, owner.name, owner.kind);
    store
        .update_config(&updated)
        .await
        .map_err(|e| ChildError::new(child.kind(), child.name(), e))?;

    info!("Added owner reference to {} {}", child.kind(), child.display_name());
    events
        .publish(
            &child.object_ref(),
            reasons::ADD_WATCH,
            format!("Adding watch for {} {}", child.kind(), child.name()),
        )
        .await;
    Ok(())
}

/// Remove the owner's link from every given child.
///
/// Children without a link are left untouched. All children are attempted and
/// the failures reported together.
#[instrument(skip(store, events, children), fields(children = children.len()))]
pub async fn remove_owner_references<S, E>(
    store: &S,
    events: &E,
    owner_name: &str,
    children: Vec<ConfigObject>,
) -> Result<()>
where
    S: ObjectStore,
    E: EventPublisher,
{
    let mut errors = ChildErrors::default();

    for mut child in children {
        if !remove_owner_link(&mut child, owner_name) {
            debug!("{} {} has no owner reference", child.kind(), child.display_name());
            continue;
        }

        if let Err(e) = store.update_config(&child).await {
            errors.push(ChildError::new(child.kind(), child.name(), e));
            continue;
        }

        info!("Removed owner reference from {} {}", child.kind(), child.display_name());
        events
            .publish(
                &child.object_ref(),
                reasons::REMOVE_WATCH,
                format!("Removing watch for {} {}", child.kind(), child.name()),
            )
            .await;
    }

    errors.into_result(RollerError::RemoveReferences)
}

/// Existing children the workload no longer references
pub fn get_orphans(existing: Vec<ConfigObject>, current: &[ConfigObjectBinding]) -> Vec<ConfigObject> {
    let current: HashSet<(ConfigKind, String)> =
        current.iter().map(|c| identity(&c.object)).collect();

    existing
        .into_iter()
        .filter(|child| !current.contains(&identity(child)))
        .collect()
}

/// Objects are matched by UID, the name only stands in for objects not yet persisted
fn identity(object: &ConfigObject) -> (ConfigKind, String) {
    let id = object
        .uid()
        .map(str::to_string)
        .unwrap_or_else(|| object.name());
    (object.kind(), id)
}
