// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use roller::config::Config;
use roller::core::Handler;
use roller::kubernetes::{KubeEventPublisher, KubeStore};
use roller::reconcilers::WorkloadReconciler;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Roller operator");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: watch_namespace={}, resync_interval={:?}, error_requeue_interval={:?}",
        config.watch_namespace.as_deref().unwrap_or("<all>"),
        config.resync_interval,
        config.error_requeue_interval
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // One handler is shared by all workload kinds
    let handler = Arc::new(Handler::new(
        KubeStore::new(client.clone()),
        KubeEventPublisher::new(client.clone()),
    ));

    let deployments =
        WorkloadReconciler::<Deployment>::new(client.clone(), handler.clone(), config.clone());
    let statefulsets =
        WorkloadReconciler::<StatefulSet>::new(client.clone(), handler.clone(), config.clone());
    let daemonsets = WorkloadReconciler::<DaemonSet>::new(client, handler, config);

    info!("Starting reconcilers...");

    tokio::try_join!(deployments.run(), statefulsets.run(), daemonsets.run())?;

    warn!("All reconcilers stopped unexpectedly");
    Ok(())
}
