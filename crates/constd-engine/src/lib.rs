// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The Metrics Client, Instance Pool (Watcher), and Reconciler: the
//! Supervisor's autoscaling control loop.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod autoscale;
pub mod metrics_client;
pub mod reconcile;
pub mod watcher;

pub use autoscale::{decide, threshold_for, ScaleDecision};
pub use metrics_client::{MetricsClient, MetricsError};
pub use reconcile::{EngineError, Reconciler};
pub use watcher::{Instance, Watcher, WatcherReport, DEFAULT_TERMINATION_GRACE};
