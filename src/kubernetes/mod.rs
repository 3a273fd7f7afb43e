// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes collaborators of the engine: object store access and event publishing.

pub mod events;
pub mod store;

pub use events::{EventPublisher, KubeEventPublisher};
pub use store::{KubeStore, ObjectStore};
