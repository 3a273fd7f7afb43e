// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes event publishing

use crate::constants::OPERATOR_NAME;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::Client;
use tracing::warn;

/// Publishes informational events about objects the engine touches
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, reference: &ObjectReference, reason: &str, note: String);
}

/// [`EventPublisher`] that records Kubernetes events
pub struct KubeEventPublisher {
    recorder: Recorder,
}

impl KubeEventPublisher {
    pub fn new(client: Client) -> Self {
        let reporter = Reporter {
            controller: OPERATOR_NAME.to_string(),
            instance: std::env::var("POD_NAME").ok(),
        };
        Self {
            recorder: Recorder::new(client, reporter),
        }
    }
}

#[async_trait]
impl EventPublisher for KubeEventPublisher {
    async fn publish(&self, reference: &ObjectReference, reason: &str, note: String) {
        let event = Event {
            type_: EventType::Normal,
            reason: reason.to_string(),
            note: Some(note),
            action: reason.to_string(),
            secondary: None,
        };

        // Events are informational, a failure to record one never fails a reconcile
        if let Err(e) = self.recorder.publish(&event, reference).await {
            warn!(
                "Failed to publish {} event for {}/{}: {}",
                reason,
                reference.namespace.as_deref().unwrap_or_default(),
                reference.name.as_deref().unwrap_or_default(),
                e
            );
        }
    }
}
