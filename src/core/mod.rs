// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The reconciliation engine, independent of how the store is reached.

pub mod annotations;
pub mod children;
pub mod finalizer;
pub mod handler;
pub mod hash;
pub mod ownership;
pub mod references;

pub use handler::{lifecycle_state, Handler, LifecycleState};
pub use hash::{calculate_config_hash, ConfigObjectBinding};
pub use references::{resolve_workload, ReferenceMetadata, ResolvedReferences};
