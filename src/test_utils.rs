// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mocked Kubernetes API, an in-memory object store and fixtures.

use crate::constants::annotations;
use crate::core::annotations::owner_link;
use crate::error::{Result, RollerError};
use crate::kubernetes::{EventPublisher, ObjectStore};
use crate::types::{ConfigKind, ConfigObject, Workload};
use async_trait::async_trait;
use http::{Request, Response};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    ConfigMap, ObjectReference, PodSpec, PodTemplateSpec, Secret,
};
use k8s_openapi::ByteString;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::{Client, ResourceExt};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for PUT requests matching the exact path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();
        responses
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);

        Box::pin(async move {
            let (status, body) = response.unwrap_or_else(|| (404, not_found_json("", &path)));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock ConfigMap JSON response
pub fn config_map_json(name: &str, namespace: &str, data: &[(&str, &str)]) -> String {
    let data: BTreeMap<&str, &str> = data.iter().copied().collect();
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("uid-{}", name),
            "resourceVersion": "1"
        },
        "data": data
    })
    .to_string()
}

/// Create a mock Deployment JSON response
pub fn deployment_json(name: &str, namespace: &str) -> String {
    serde_json::json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": format!("uid-{}", name),
            "resourceVersion": "1"
        },
        "spec": {
            "selector": {"matchLabels": {"app": name}},
            "template": {
                "metadata": {"labels": {"app": name}},
                "spec": {"containers": [{"name": "app", "image": "app:latest"}]}
            }
        }
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

fn unavailable(what: &str) -> RollerError {
    RollerError::KubeError(kube::Error::Service(
        format!("injected failure for {}", what).into(),
    ))
}

fn next_version(version: Option<&String>) -> String {
    let current: u64 = version.and_then(|v| v.parse().ok()).unwrap_or(0);
    (current + 1).to_string()
}

type WorkloadKey = (String, String, String);
type ConfigKey = (ConfigKind, String, String);

#[derive(Default)]
struct StoreState {
    workloads: BTreeMap<WorkloadKey, serde_json::Value>,
    configs: BTreeMap<ConfigKey, ConfigObject>,
    workload_writes: usize,
    config_writes: usize,
    fail_workload_updates: bool,
    failing_config_updates: BTreeSet<(ConfigKind, String)>,
    failing_config_gets: BTreeSet<(ConfigKind, String)>,
    failing_config_lists: BTreeSet<ConfigKind>,
}

/// Check if the child carries any ownership link for the named workload
pub fn is_owned_by(child: &ConfigObject, owner_name: &str) -> bool {
    owner_link(child, owner_name).is_some()
}

/// In-memory [`ObjectStore`] with optimistic concurrency on `resourceVersion`.
///
/// Only writes made through the [`ObjectStore`] trait are counted; the `put_*`
/// helpers simulate changes made by someone else.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

fn workload_key<W: Workload>(namespace: &str, name: &str) -> WorkloadKey {
    (W::workload_kind(), namespace.to_string(), name.to_string())
}

fn config_key(object: &ConfigObject) -> ConfigKey {
    (
        object.kind(),
        object.namespace().unwrap_or_default(),
        object.name(),
    )
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workload<W: Workload>(self, workload: W) -> Self {
        self.put_workload(workload);
        self
    }

    pub fn with_config(self, object: impl Into<ConfigObject>) -> Self {
        self.put_config(object);
        self
    }

    /// Store a workload as if changed by someone else
    pub fn put_workload<W: Workload>(&self, mut workload: W) {
        let mut state = self.state.lock().unwrap();
        let key = workload_key::<W>(
            &workload.namespace().unwrap_or_default(),
            &workload.name_any(),
        );
        let stored_version = state
            .workloads
            .get(&key)
            .and_then(|v| v.pointer("/metadata/resourceVersion"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        workload.meta_mut().resource_version = Some(next_version(stored_version.as_ref()));
        if workload.meta().uid.is_none() {
            workload.meta_mut().uid = Some(format!("uid-{}", workload.name_any()));
        }
        let value = serde_json::to_value(&workload).expect("workload serializes");
        state.workloads.insert(key, value);
    }

    /// Store a ConfigMap or Secret as if changed by someone else
    pub fn put_config(&self, object: impl Into<ConfigObject>) {
        let mut object = object.into();
        let mut state = self.state.lock().unwrap();
        let key = config_key(&object);
        let stored = state.configs.get(&key);
        let version = next_version(stored.and_then(|s| s.meta().resource_version.as_ref()));
        let uid = object
            .uid()
            .map(str::to_string)
            .or_else(|| stored.and_then(|s| s.uid()).map(str::to_string))
            .unwrap_or_else(|| format!("uid-{}-{}", object.kind(), object.name()));
        object.meta_mut().resource_version = Some(version);
        object.meta_mut().uid = Some(uid);
        state.configs.insert(key, object);
    }

    pub fn workload<W: Workload>(&self, namespace: &str, name: &str) -> Option<W> {
        let state = self.state.lock().unwrap();
        state
            .workloads
            .get(&workload_key::<W>(namespace, name))
            .map(|v| serde_json::from_value(v.clone()).expect("workload deserializes"))
    }

    pub fn config(&self, kind: ConfigKind, namespace: &str, name: &str) -> Option<ConfigObject> {
        let state = self.state.lock().unwrap();
        state
            .configs
            .get(&(kind, namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn workload_writes(&self) -> usize {
        self.state.lock().unwrap().workload_writes
    }

    pub fn config_writes(&self) -> usize {
        self.state.lock().unwrap().config_writes
    }

    /// Total number of writes made through the store
    pub fn writes(&self) -> usize {
        self.workload_writes() + self.config_writes()
    }

    pub fn fail_workload_updates(&self) {
        self.state.lock().unwrap().fail_workload_updates = true;
    }

    pub fn fail_updates_for(&self, kind: ConfigKind, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_config_updates
            .insert((kind, name.to_string()));
    }

    pub fn fail_gets_for(&self, kind: ConfigKind, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_config_gets
            .insert((kind, name.to_string()));
    }

    pub fn fail_lists_for(&self, kind: ConfigKind) {
        self.state.lock().unwrap().failing_config_lists.insert(kind);
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn get_workload<W: Workload>(&self, namespace: &str, name: &str) -> Result<Option<W>> {
        Ok(self.workload(namespace, name))
    }

    async fn update_workload<W: Workload>(&self, workload: &W) -> Result<W> {
        let mut state = self.state.lock().unwrap();
        let namespace = workload.namespace().unwrap_or_default();
        let name = workload.name_any();
        let key = workload_key::<W>(&namespace, &name);

        if state.fail_workload_updates {
            return Err(unavailable(&name));
        }
        let Some(stored) = state.workloads.get(&key) else {
            return Err(RollerError::NotFound {
                kind: W::workload_kind(),
                namespace,
                name,
            });
        };
        let stored_version = stored
            .pointer("/metadata/resourceVersion")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        if stored_version != workload.resource_version() {
            return Err(RollerError::Conflict {
                kind: W::workload_kind(),
                namespace,
                name,
            });
        }

        let mut updated = workload.clone();
        updated.meta_mut().resource_version = Some(next_version(stored_version.as_ref()));
        state
            .workloads
            .insert(key, serde_json::to_value(&updated).expect("workload serializes"));
        state.workload_writes += 1;
        Ok(updated)
    }

    async fn get_config(
        &self,
        kind: ConfigKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigObject>> {
        let failing = self
            .state
            .lock()
            .unwrap()
            .failing_config_gets
            .contains(&(kind, name.to_string()));
        if failing {
            return Err(unavailable(name));
        }
        Ok(self.config(kind, namespace, name))
    }

    async fn list_configs(&self, kind: ConfigKind, namespace: &str) -> Result<Vec<ConfigObject>> {
        let state = self.state.lock().unwrap();
        if state.failing_config_lists.contains(&kind) {
            return Err(unavailable(kind.as_str()));
        }
        Ok(state
            .configs
            .iter()
            .filter(|((k, ns, _), _)| *k == kind && ns == namespace)
            .map(|(_, object)| object.clone())
            .collect())
    }

    async fn update_config(&self, object: &ConfigObject) -> Result<ConfigObject> {
        let mut state = self.state.lock().unwrap();
        let key = config_key(object);

        if state
            .failing_config_updates
            .contains(&(object.kind(), object.name()))
        {
            return Err(unavailable(&object.name()));
        }
        let Some(stored) = state.configs.get(&key) else {
            return Err(RollerError::NotFound {
                kind: object.kind().to_string(),
                namespace: key.1.clone(),
                name: key.2.clone(),
            });
        };
        if stored.meta().resource_version != object.meta().resource_version {
            return Err(RollerError::Conflict {
                kind: object.kind().to_string(),
                namespace: key.1.clone(),
                name: key.2.clone(),
            });
        }

        let mut updated = object.clone();
        updated.meta_mut().resource_version =
            Some(next_version(stored.meta().resource_version.as_ref()));
        state.configs.insert(key, updated.clone());
        state.config_writes += 1;
        Ok(updated)
    }
}

/// [`EventPublisher`] that keeps every published event
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    events: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl RecordingPublisher {
    /// Reasons of all published events, in publishing order
    pub fn reasons(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, reason)| reason.clone())
            .collect()
    }

    /// `(kind, name, reason)` of all published events
    pub fn events(&self) -> Vec<(String, String, String)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, reference: &ObjectReference, reason: &str, _note: String) {
        self.events.lock().unwrap().push((
            reference.kind.clone().unwrap_or_default(),
            reference.name.clone().unwrap_or_default(),
            reason.to_string(),
        ));
    }
}

pub fn make_config_map(name: &str, data: &[(&str, &str)]) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ),
        ..Default::default()
    }
}

pub fn make_secret(name: &str, data: &[(&str, &str)]) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(k, v)| (k.to_string(), ByteString(v.as_bytes().to_vec())))
                .collect(),
        ),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}

/// A Deployment in `default` with the required annotation and the given pod spec
pub fn make_deployment(name: &str, pod_spec: PodSpec) -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            annotations: Some(BTreeMap::from([(
                annotations::REQUIRED.to_string(),
                annotations::REQUIRED_VALUE.to_string(),
            )])),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            template: PodTemplateSpec {
                spec: Some(pod_spec),
                ..Default::default()
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}
