// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource types the engine works on: workloads and the configuration they reference.

pub mod config_object;
pub mod workload;

pub use config_object::{ConfigKind, ConfigObject};
pub use workload::Workload;
