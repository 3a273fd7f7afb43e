// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Object store access for workloads, ConfigMaps and Secrets

use crate::error::{Result, RollerError};
use crate::types::{ConfigKind, ConfigObject, Workload};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::NamespaceResourceScope;
use kube::{
    api::{ListParams, PostParams},
    Api, Client, Resource, ResourceExt,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, instrument};

/// Get, list and update primitives the engine needs from the API server.
///
/// Updates replace the whole object and carry its `resourceVersion`, so a
/// concurrent modification fails with [`RollerError::Conflict`] instead of
/// being overwritten.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Get a workload, `None` when it does not exist
    async fn get_workload<W: Workload>(&self, namespace: &str, name: &str) -> Result<Option<W>>;

    async fn update_workload<W: Workload>(&self, workload: &W) -> Result<W>;

    /// Get a ConfigMap or Secret, `None` when it does not exist
    async fn get_config(
        &self,
        kind: ConfigKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigObject>>;

    /// List every ConfigMap or Secret in a namespace
    async fn list_configs(&self, kind: ConfigKind, namespace: &str) -> Result<Vec<ConfigObject>>;

    async fn update_config(&self, object: &ConfigObject) -> Result<ConfigObject>;
}

/// [`ObjectStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<DynamicType = (), Scope = NamespaceResourceScope>,
    {
        Api::namespaced(self.client.clone(), namespace)
    }
}

async fn get_opt<K>(api: &Api<K>, name: &str) -> Result<Option<K>>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    match api.get(name).await {
        Ok(obj) => Ok(Some(obj)),
        Err(kube::Error::Api(err)) if err.code == 404 => {
            debug!("{} not found", name);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

async fn replace<K>(api: &Api<K>, obj: &K) -> Result<K>
where
    K: Resource<DynamicType = ()> + Clone + Serialize + DeserializeOwned + Debug,
{
    let name = obj
        .meta()
        .name
        .as_deref()
        .ok_or(RollerError::MissingObjectKey(".metadata.name"))?;

    match api.replace(name, &PostParams::default(), obj).await {
        Ok(updated) => Ok(updated),
        Err(kube::Error::Api(err)) if err.code == 409 => Err(RollerError::Conflict {
            kind: K::kind(&()).to_string(),
            namespace: obj.namespace().unwrap_or_default(),
            name: name.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

fn namespace_of<K: Resource>(obj: &K) -> Result<String> {
    obj.meta()
        .namespace
        .clone()
        .ok_or(RollerError::MissingObjectKey(".metadata.namespace"))
}

#[async_trait]
impl ObjectStore for KubeStore {
    #[instrument(skip(self))]
    async fn get_workload<W: Workload>(&self, namespace: &str, name: &str) -> Result<Option<W>> {
        get_opt(&self.api::<W>(namespace), name).await
    }

    #[instrument(skip(self, workload), fields(workload = %workload.display_name()))]
    async fn update_workload<W: Workload>(&self, workload: &W) -> Result<W> {
        let namespace = namespace_of(workload)?;
        replace(&self.api::<W>(&namespace), workload).await
    }

    #[instrument(skip(self))]
    async fn get_config(
        &self,
        kind: ConfigKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ConfigObject>> {
        Ok(match kind {
            ConfigKind::ConfigMap => get_opt(&self.api::<ConfigMap>(namespace), name)
                .await?
                .map(ConfigObject::from),
            ConfigKind::Secret => get_opt(&self.api::<Secret>(namespace), name)
                .await?
                .map(ConfigObject::from),
        })
    }

    #[instrument(skip(self))]
    async fn list_configs(&self, kind: ConfigKind, namespace: &str) -> Result<Vec<ConfigObject>> {
        let lp = ListParams::default();
        Ok(match kind {
            ConfigKind::ConfigMap => self
                .api::<ConfigMap>(namespace)
                .list(&lp)
                .await?
                .items
                .into_iter()
                .map(ConfigObject::from)
                .collect(),
            ConfigKind::Secret => self
                .api::<Secret>(namespace)
                .list(&lp)
                .await?
                .items
                .into_iter()
                .map(ConfigObject::from)
                .collect(),
        })
    }

    #[instrument(skip(self, object), fields(child = %object.display_name(), kind = %object.kind()))]
    async fn update_config(&self, object: &ConfigObject) -> Result<ConfigObject> {
        Ok(match object {
            ConfigObject::ConfigMap(cm) => {
                let namespace = namespace_of(cm)?;
                replace(&self.api::<ConfigMap>(&namespace), cm).await?.into()
            }
            ConfigObject::Secret(s) => {
                let namespace = namespace_of(s)?;
                replace(&self.api::<Secret>(&namespace), s).await?.into()
            }
        })
    }
}
