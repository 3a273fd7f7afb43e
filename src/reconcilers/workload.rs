// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Workload reconciler - watches one workload kind together with the
//! ConfigMaps and Secrets linked to it, and drives the handler.

use crate::config::Config;
use crate::core::annotations::owner_names;
use crate::core::Handler;
use crate::error::{Result, RollerError};
use crate::kubernetes::{KubeEventPublisher, KubeStore};
use crate::types::Workload;
use futures::StreamExt;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::NamespaceResourceScope;
use kube::{
    runtime::{controller::Action, reflector::ObjectRef, Controller},
    Api, Client, Resource, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// The handler as wired against the Kubernetes API
pub type KubeHandler = Handler<KubeStore, KubeEventPublisher>;

pub struct WorkloadReconciler<W> {
    client: Client,
    handler: Arc<KubeHandler>,
    config: Config,
    _kind: PhantomData<fn() -> W>,
}

impl<W: Workload> WorkloadReconciler<W> {
    pub fn new(client: Client, handler: Arc<KubeHandler>, config: Config) -> Self {
        Self {
            client,
            handler,
            config,
            _kind: PhantomData,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let namespace = self.config.watch_namespace.clone();
        let workloads: Api<W> = scoped_api(&self.client, namespace.as_deref());
        let config_maps: Api<ConfigMap> = scoped_api(&self.client, namespace.as_deref());
        let secrets: Api<Secret> = scoped_api(&self.client, namespace.as_deref());

        info!(
            "Starting {} reconciler in {}",
            W::workload_kind(),
            namespace.as_deref().unwrap_or("all namespaces")
        );
        let context = Arc::new(self);

        Controller::new(workloads, WatcherConfig::default())
            .watches(config_maps, WatcherConfig::default(), |cm| linked_workloads::<W, _>(&cm))
            .watches(secrets, WatcherConfig::default(), |s| linked_workloads::<W, _>(&s))
            .run(reconcile::<W>, error_policy::<W>, context)
            .for_each(|res| async move {
                match res {
                    Ok((o, _)) => debug!("Reconciled {} {}", W::workload_kind(), o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }
}

fn scoped_api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<Scope = NamespaceResourceScope> + DeserializeOwned,
    K::DynamicType: Default,
{
    match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    }
}

/// Workloads a ConfigMap or Secret is linked to, in the object's namespace
fn linked_workloads<W, C>(child: &C) -> Vec<ObjectRef<W>>
where
    W: Workload,
    C: Resource,
{
    let Some(namespace) = child.namespace() else {
        return vec![];
    };

    owner_names(child.annotations())
        .into_iter()
        .map(|name| ObjectRef::new(&name).within(&namespace))
        .collect()
}

async fn reconcile<W: Workload>(workload: Arc<W>, ctx: Arc<WorkloadReconciler<W>>) -> Result<Action> {
    let name = workload.name_any();
    let namespace = workload
        .namespace()
        .ok_or(RollerError::MissingObjectKey(".metadata.namespace"))?;

    debug!("Reconciling {}: {}/{}", W::workload_kind(), namespace, name);

    ctx.handler.reconcile::<W>(&namespace, &name).await?;

    Ok(Action::requeue(ctx.config.resync_interval))
}

fn error_policy<W: Workload>(
    workload: Arc<W>,
    error: &RollerError,
    ctx: Arc<WorkloadReconciler<W>>,
) -> Action {
    error!(
        "Reconciliation of {} {} failed: {}",
        W::workload_kind(),
        workload.display_name(),
        error
    );
    Action::requeue(ctx.config.error_requeue_interval)
}
