// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-workload convergence: link children, hash their content and roll the
//! pod template when the hash changes.

use crate::core::annotations::has_required_annotation;
use crate::core::children::{get_current_children, get_existing_children};
use crate::core::finalizer::{add_finalizer, has_finalizer, remove_finalizer};
use crate::core::hash::calculate_config_hash;
use crate::core::ownership::{remove_owner_references, update_owner_references, Owner};
use crate::core::references::resolve_workload;
use crate::error::{Result, RollerError};
use crate::kubernetes::{EventPublisher, ObjectStore};
use crate::types::Workload;
use futures::future::try_join;
use kube::ResourceExt;
use tracing::{debug, info, instrument};

/// Where a workload stands in its Roller lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    /// Not enabled and nothing to clean up
    Ignored,
    /// Enabled and not being deleted
    Active,
    /// Being deleted, or disabled while links may still exist
    Deleting,
}

pub fn lifecycle_state<W: Workload>(workload: &W) -> LifecycleState {
    if !has_required_annotation(workload) {
        if has_finalizer(workload) {
            return LifecycleState::Deleting;
        }
        return LifecycleState::Ignored;
    }

    if workload.is_marked_for_deletion() {
        LifecycleState::Deleting
    } else {
        LifecycleState::Active
    }
}

/// Reconciles workloads against the configuration they reference.
///
/// Every invocation derives the desired state from what is in the store, so
/// a failed invocation is fixed by simply running it again.
pub struct Handler<S, E> {
    store: S,
    events: E,
}

impl<S, E> Handler<S, E>
where
    S: ObjectStore,
    E: EventPublisher,
{
    pub fn new(store: S, events: E) -> Self {
        Self { store, events }
    }

    /// Load the workload and converge it, a missing workload is already done
    #[instrument(skip(self), fields(kind = %W::workload_kind()))]
    pub async fn reconcile<W: Workload>(&self, namespace: &str, name: &str) -> Result<()> {
        let Some(instance) = self.store.get_workload::<W>(namespace, name).await? else {
            debug!("{} {}/{} not found, assuming deleted", W::workload_kind(), namespace, name);
            return Ok(());
        };

        self.handle_workload(&instance).await
    }

    pub async fn handle_workload<W: Workload>(&self, instance: &W) -> Result<()> {
        match lifecycle_state(instance) {
            LifecycleState::Ignored => {
                debug!("{} does not have required annotation, skipping", instance.display_name());
                Ok(())
            }
            LifecycleState::Deleting => {
                if instance.is_marked_for_deletion() {
                    info!("{} marked for deletion, cleaning up orphans", instance.display_name());
                } else {
                    info!(
                        "Required annotation removed from {}, cleaning up orphans",
                        instance.display_name()
                    );
                }
                self.handle_delete(instance).await
            }
            LifecycleState::Active => self.handle_active(instance).await,
        }
    }

    async fn handle_active<W: Workload>(&self, instance: &W) -> Result<()> {
        let namespace = namespace_of(instance)?;
        let name = instance.name_any();
        let kind = W::workload_kind();
        let owner = Owner {
            name: &name,
            kind: &kind,
        };
        let references = resolve_workload(instance);

        let (existing, current) = try_join(
            get_existing_children(&self.store, &namespace, owner),
            get_current_children(&self.store, &namespace, &references),
        )
        .await?;

        update_owner_references(&self.store, &self.events, owner, existing, &current).await?;

        let hash = calculate_config_hash(&current)?;

        let mut desired = instance.clone();
        desired.set_config_hash(&hash);
        add_finalizer(&mut desired);

        if desired == *instance {
            debug!("{} is up to date", instance.display_name());
            return Ok(());
        }

        info!("Updating {} hash to {}", instance.display_name(), hash);
        self.update_workload(&desired).await
    }

    async fn handle_delete<W: Workload>(&self, instance: &W) -> Result<()> {
        let namespace = namespace_of(instance)?;
        let name = instance.name_any();
        let kind = W::workload_kind();
        let owner = Owner {
            name: &name,
            kind: &kind,
        };

        let existing = get_existing_children(&self.store, &namespace, owner).await?;
        remove_owner_references(&self.store, &self.events, &name, existing).await?;

        let mut desired = instance.clone();
        remove_finalizer(&mut desired);
        if desired != *instance {
            info!("Removing finalizer from {}", instance.display_name());
            self.update_workload(&desired).await?;
        }

        Ok(())
    }

    async fn update_workload<W: Workload>(&self, desired: &W) -> Result<()> {
        self.store
            .update_workload(desired)
            .await
            .map(|_| ())
            .map_err(|e| RollerError::WorkloadUpdate {
                kind: W::workload_kind(),
                namespace: desired.namespace().unwrap_or_default(),
                name: desired.name_any(),
                source: Box::new(e),
            })
    }
}

fn namespace_of<W: Workload>(workload: &W) -> Result<String> {
    workload
        .namespace()
        .ok_or(RollerError::MissingObjectKey(".metadata.namespace"))
}
