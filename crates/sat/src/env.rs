// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! `SAT_*` environment variable resolution into a [`RunnerConfig`].
//!
//! Mirrors `original_source/sat/options/options.go`'s env-prefixed
//! resolution, generalized into one function per field so each is
//! independently testable. `SAT_TRACER_*` is read as an opaque key/value
//! subtree, per `spec.md` §6 ("tracer subtree is opaque to the core").

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::config::RunnerConfig;

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

pub fn http_port() -> u16 {
    var("SAT_HTTP_PORT").and_then(|s| s.parse().ok()).unwrap_or(8081)
}

pub fn control_plane() -> Option<String> {
    var("SAT_CONTROL_PLANE")
}

pub fn env_token() -> String {
    var("SAT_ENV_TOKEN").unwrap_or_default()
}

pub fn runnable_ident() -> Option<String> {
    var("SAT_RUNNABLE_IDENT")
}

pub fn runnable_version() -> Option<String> {
    var("SAT_RUNNABLE_VERSION")
}

pub fn uuid() -> Uuid {
    var("SAT_UUID").and_then(|s| s.parse().ok()).unwrap_or_else(Uuid::new_v4)
}

/// Comma-separated list of mesh peer URLs to eagerly dial on startup.
pub fn peers() -> Vec<String> {
    var("SAT_PEERS")
        .map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

/// The `SAT_TRACER_*` subtree, keyed by the suffix after `SAT_TRACER_`. Never
/// interpreted by the core; carried so a tracer integration can read it.
pub fn tracer_config() -> BTreeMap<String, String> {
    std::env::vars()
        .filter_map(|(k, v)| k.strip_prefix("SAT_TRACER_").map(|suffix| (suffix.to_string(), v)))
        .collect()
}

/// Builds the complete [`RunnerConfig`] from the environment plus the one
/// CLI positional argument (a path, URL, or FQFN).
pub fn load(target: String, use_stdin: bool) -> RunnerConfig {
    RunnerConfig {
        target,
        use_stdin,
        http_port: http_port(),
        control_plane: control_plane(),
        env_token: env_token(),
        runnable_ident: runnable_ident(),
        runnable_version: runnable_version(),
        uuid: uuid(),
        peers: peers(),
        tracer_config: tracer_config(),
    }
}
