// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Shared error kinds, per the error taxonomy in `spec.md` §7.

use thiserror::Error;

/// Malformed or missing configuration. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),
    #[error("invalid value for {field}: {value:?}")]
    Invalid { field: &'static str, value: String },
}
