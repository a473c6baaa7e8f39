// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Scheduler metrics, as reported by a Runner's `/meta/metrics` endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerMetrics {
    pub total_thread_count: u64,
}

/// The envelope returned by `GET /meta/metrics`: `{"scheduler": {...}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub scheduler: SchedulerMetrics,
}
