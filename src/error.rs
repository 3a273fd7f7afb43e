// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::ConfigKind;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RollerError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Conflict updating {kind} {namespace}/{name}: the object has been modified")]
    Conflict {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("Missing object key: {0}")]
    MissingObjectKey(&'static str),

    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: String,
        namespace: String,
        name: String,
    },

    #[error("Failed to serialize configuration for hashing: {0}")]
    HashError(#[from] serde_json::Error),

    #[error("error(s) encountered fetching current children: {0}")]
    FetchChildren(ChildErrors),

    #[error("error(s) encountered listing existing children: {0}")]
    ListChildren(ChildErrors),

    #[error("error(s) encountered updating children: {0}")]
    UpdateChildren(ChildErrors),

    #[error("error(s) encountered removing owner references: {0}")]
    RemoveReferences(ChildErrors),

    #[error("error updating {kind} {namespace}/{name}: {source}")]
    WorkloadUpdate {
        kind: String,
        namespace: String,
        name: String,
        #[source]
        source: Box<RollerError>,
    },
}

/// A failure on one ConfigMap or Secret, or on listing one kind in a namespace
#[derive(Error, Debug)]
#[error("{kind} {name}: {source}")]
pub struct ChildError {
    pub kind: ConfigKind,
    /// Object name, or the namespace for a failed list
    pub name: String,
    #[source]
    pub source: Box<RollerError>,
}

impl ChildError {
    pub fn new(kind: ConfigKind, name: impl Into<String>, source: RollerError) -> Self {
        ChildError {
            kind,
            name: name.into(),
            source: Box::new(source),
        }
    }
}

/// Every failure of a fan-out over children, reported together
#[derive(Debug, Default)]
pub struct ChildErrors(pub Vec<ChildError>);

impl ChildErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, error: ChildError) {
        self.0.push(error);
    }

    /// Names of every failing child, as `Kind/name`
    pub fn names(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|e| format!("{}/{}", e.kind, e.name))
            .collect()
    }

    /// `Ok(())` when nothing failed, otherwise the errors wrapped by `wrap`
    pub fn into_result(self, wrap: impl FnOnce(ChildErrors) -> RollerError) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(wrap(self))
        }
    }
}

impl fmt::Display for ChildErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl FromIterator<ChildError> for ChildErrors {
    fn from_iter<I: IntoIterator<Item = ChildError>>(iter: I) -> Self {
        ChildErrors(iter.into_iter().collect())
    }
}

pub type Result<T> = std::result::Result<T, RollerError>;
