// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Finalizer bookkeeping on workloads

use crate::constants::FINALIZER;
use crate::types::Workload;
use kube::ResourceExt;

/// Check if the workload carries the Roller finalizer
pub fn has_finalizer<W: Workload>(workload: &W) -> bool {
    workload.finalizers().iter().any(|f| f == FINALIZER)
}

/// Add the Roller finalizer unless already present
pub fn add_finalizer<W: Workload>(workload: &mut W) {
    if !has_finalizer(workload) {
        workload.finalizers_mut().push(FINALIZER.to_string());
    }
}

/// Remove every occurrence of the Roller finalizer, keeping the others in order
pub fn remove_finalizer<W: Workload>(workload: &mut W) {
    if has_finalizer(workload) {
        workload.finalizers_mut().retain(|f| f != FINALIZER);
    }
}
