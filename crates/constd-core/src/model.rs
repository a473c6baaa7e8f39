// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Shared data model: Runnable, Application, and Supervisor configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::fqfn::Fqfn;

/// A deployable WebAssembly function plus its capability configuration.
///
/// `module_bytes` and `module_ref` are mutually exclusive module sources;
/// which one is populated depends on how the App Source obtained the
/// Runnable (bundled inline, or referenced by URL).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runnable {
    pub name: String,
    pub namespace: String,
    pub fqfn: Fqfn,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_bytes: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_ref: Option<String>,
    #[serde(default)]
    pub capabilities: HashMap<String, serde_json::Value>,
}

/// A versioned collection of Runnables sharing an identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub identifier: String,
    pub app_version: String,
    pub runnables: Vec<Runnable>,
}

/// One execution mode for rendering Runner/proxy launch commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    Docker,
    Metal,
}

impl Default for ExecMode {
    fn default() -> Self {
        ExecMode::Docker
    }
}

impl std::str::FromStr for ExecMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "docker" => Ok(ExecMode::Docker),
            "metal" => Ok(ExecMode::Metal),
            other => Err(format!("invalid exec mode: {other}")),
        }
    }
}

/// `localhost:9090` means "the Supervisor is the control plane".
pub const DEFAULT_CONTROL_PLANE: &str = "localhost:9090";

/// Complete enumeration of Supervisor configuration, read from `CONSTD_*`
/// environment variables (see `constd::env`).
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub bundle_path: Option<std::path::PathBuf>,
    pub exec_mode: ExecMode,
    pub sat_version: String,
    pub atmo_version: String,
    pub atmo_port: u16,
    pub control_plane: String,
    pub env_token: String,
    pub upstream_host: Option<String>,
    pub headless: bool,
}

impl SupervisorConfig {
    pub fn is_embedded_control_plane(&self) -> bool {
        self.control_plane == DEFAULT_CONTROL_PLANE
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            bundle_path: None,
            exec_mode: ExecMode::Docker,
            sat_version: "latest".to_string(),
            atmo_version: "latest".to_string(),
            atmo_port: 8080,
            control_plane: DEFAULT_CONTROL_PLANE.to_string(),
            env_token: String::new(),
            upstream_host: None,
            headless: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_control_plane_means_embedded() {
        let cfg = SupervisorConfig::default();
        assert!(cfg.is_embedded_control_plane());
    }

    #[test]
    fn non_default_control_plane_is_remote() {
        let cfg = SupervisorConfig { control_plane: "cp:9090".to_string(), ..Default::default() };
        assert!(!cfg.is_embedded_control_plane());
    }

    #[test]
    fn exec_mode_parses_known_values() {
        assert_eq!("docker".parse::<ExecMode>().unwrap(), ExecMode::Docker);
        assert_eq!("metal".parse::<ExecMode>().unwrap(), ExecMode::Metal);
        assert!("vm".parse::<ExecMode>().is_err());
    }
}
