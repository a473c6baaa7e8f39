// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! `CONSTD_*` environment variable resolution into a [`SupervisorConfig`].
//!
//! Mirrors `original_source/constd/config/config.go`'s env-prefixed
//! resolution, generalized into one function per field so each is
//! independently testable.

use std::path::PathBuf;

use constd_core::{ExecMode, SupervisorConfig, DEFAULT_CONTROL_PLANE};

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

pub fn exec_mode() -> ExecMode {
    var("CONSTD_EXEC_MODE").and_then(|s| s.parse().ok()).unwrap_or_default()
}

pub fn sat_version() -> String {
    var("CONSTD_SAT_VERSION").unwrap_or_else(|| "latest".to_string())
}

pub fn atmo_version() -> String {
    var("CONSTD_ATMO_VERSION").unwrap_or_else(|| "latest".to_string())
}

pub fn atmo_port() -> u16 {
    var("CONSTD_ATMO_PORT").and_then(|s| s.parse().ok()).unwrap_or(8080)
}

pub fn control_plane() -> String {
    var("CONSTD_CONTROL_PLANE").unwrap_or_else(|| DEFAULT_CONTROL_PLANE.to_string())
}

pub fn env_token() -> String {
    var("CONSTD_ENV_TOKEN").unwrap_or_default()
}

pub fn upstream_host() -> Option<String> {
    var("CONSTD_UPSTREAM_HOST")
}

pub fn headless() -> bool {
    var("CONSTD_HEADLESS").map(|s| s == "true" || s == "1").unwrap_or(false)
}

/// Builds the complete [`SupervisorConfig`] from the environment plus the
/// one CLI positional argument (the bundle path).
pub fn load(bundle_path: Option<PathBuf>) -> SupervisorConfig {
    SupervisorConfig {
        bundle_path,
        exec_mode: exec_mode(),
        sat_version: sat_version(),
        atmo_version: atmo_version(),
        atmo_port: atmo_port(),
        control_plane: control_plane(),
        env_token: env_token(),
        upstream_host: upstream_host(),
        headless: headless(),
    }
}
