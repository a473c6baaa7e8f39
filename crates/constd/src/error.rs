// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Top-level fatal error kinds for the Supervisor binary (`spec.md` §7):
//! `ConfigError` and `AppSourceUnavailable` (after retry exhaustion) both
//! terminate the process with a non-zero exit code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("configuration error: {0}")]
    Config(#[from] constd_core::ConfigError),
    #[error("app source unavailable after retrying: {0}")]
    AppSourceUnavailable(String),
    #[error("registration with remote control plane failed: {0}")]
    Registration(#[from] constd_appsource::RegistrationError),
    #[error("failed to bind control-plane server: {0}")]
    ControlPlaneBind(#[source] std::io::Error),
}
