// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Wire types shared by the `constd` Supervisor and the `sat` Runner.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod descriptor;
pub mod mesh;
pub mod metrics;
pub mod request;

pub use descriptor::ProcessDescriptor;
pub use mesh::{MeshMessage, MSG_TYPE_FN_RESULT};
pub use metrics::{MetricsResponse, SchedulerMetrics};
pub use request::{CoordinatedRequest, CoordinatedResponse, FnResult, RunErr, Sequence, Step};
