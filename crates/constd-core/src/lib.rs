// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Shared data model and primitives for the `constd` Supervisor and `sat` Runner.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod fqfn;
pub mod model;
pub mod retry;

pub use error::ConfigError;
pub use fqfn::{Fqfn, FqfnParseError};
pub use model::{Application, ExecMode, Runnable, SupervisorConfig, DEFAULT_CONTROL_PLANE};
pub use retry::{retry_with_backoff, RetryPolicy};
