// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::requeue::{ERROR_REQUEUE_SECS, RESYNC_INTERVAL_SECS};
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Restrict all controllers to this namespace, watch every namespace when unset
    pub watch_namespace: Option<String>,
    /// Requeue interval after a successful reconcile, used for drift correction
    pub resync_interval: Duration,
    /// Requeue interval after a failed reconcile
    pub error_requeue_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            watch_namespace: None,
            resync_interval: Duration::from_secs(RESYNC_INTERVAL_SECS),
            error_requeue_interval: Duration::from_secs(ERROR_REQUEUE_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty());

        let resync_interval = match lookup("RESYNC_INTERVAL_SECS") {
            Some(v) => v
                .parse()
                .context("RESYNC_INTERVAL_SECS must be a number of seconds")?,
            None => RESYNC_INTERVAL_SECS,
        };
        let error_requeue = match lookup("ERROR_REQUEUE_SECS") {
            Some(v) => v
                .parse()
                .context("ERROR_REQUEUE_SECS must be a number of seconds")?,
            None => ERROR_REQUEUE_SECS,
        };

        Ok(Config {
            watch_namespace,
            resync_interval: Duration::from_secs(resync_interval),
            error_requeue_interval: Duration::from_secs(error_requeue),
        })
    }
}
