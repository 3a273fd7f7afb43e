// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys used by Roller
pub mod annotations {
    /// When set to "true" on a workload, enables config-change rollouts for it
    pub const REQUIRED: &str = "roller.geeko.me/update-on-config-change";
    /// The only value of [`REQUIRED`] that enables processing
    pub const REQUIRED_VALUE: &str = "true";
    /// Pod template annotation carrying the hash of all referenced configuration
    pub const CONFIG_HASH: &str = "roller.geeko.me/config-hash";
    /// Prefix of the ownership link annotation set on ConfigMaps and Secrets.
    /// The full key is the prefix followed by the owning workload's name.
    pub const OWNER_PREFIX: &str = "roller.geeko.me/owner-";
}

/// Finalizer added to workloads so links can be cleaned up before deletion
pub const FINALIZER: &str = "roller.geeko.me/finalizer";

/// The operator name used as event reporter
pub const OPERATOR_NAME: &str = "roller";

/// Event reasons published on ConfigMaps and Secrets
pub mod reasons {
    pub const ADD_WATCH: &str = "AddWatch";
    pub const REMOVE_WATCH: &str = "RemoveWatch";
}

/// Requeue defaults, overridable through [`crate::config::Config`]
pub mod requeue {
    /// Steady-state requeue interval in seconds (drift correction)
    pub const RESYNC_INTERVAL_SECS: u64 = 300;
    /// Requeue interval in seconds after a failed reconcile
    pub const ERROR_REQUEUE_SECS: u64 = 60;
}
