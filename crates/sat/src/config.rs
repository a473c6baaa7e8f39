// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Runner configuration and positional-argument resolution.
//!
//! A Runner's single CLI argument is a path, a URL, or an FQFN
//! (`spec.md` §4.8 step 1). Mirrors the three-way branch in
//! `original_source/sat/config.go`'s `ConfigFromRunnableArg`, minus the
//! on-disk `.runnable.yml` capability-config sidecar and Reactr/Grav
//! setup — both belong to the WebAssembly host, the declared external
//! collaborator (`spec.md` §1, `ModuleRuntime`).

use std::collections::BTreeMap;
use std::path::PathBuf;

use constd_appsource::AppSourceError;
use constd_core::{Fqfn, Runnable};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub target: String,
    pub use_stdin: bool,
    pub http_port: u16,
    pub control_plane: Option<String>,
    pub env_token: String,
    pub runnable_ident: Option<String>,
    pub runnable_version: Option<String>,
    pub uuid: Uuid,
    pub peers: Vec<String>,
    pub tracer_config: BTreeMap<String, String>,
}

/// The three forms a Runner's positional argument can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Path(PathBuf),
    Url(String),
    Fqfn(Fqfn),
}

impl Target {
    /// Classifies a raw argument string. An FQFN parse is tried first since
    /// it is the most specific shape; anything starting with a URL scheme is
    /// a URL; everything else is a filesystem path.
    pub fn classify(raw: &str) -> Self {
        if let Ok(fqfn) = Fqfn::parse(raw) {
            return Target::Fqfn(fqfn);
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Target::Url(raw.to_string());
        }
        Target::Path(PathBuf::from(raw))
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to read runnable module from disk: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to fetch runnable module from url: {0}")]
    Http(#[from] reqwest::Error),
    #[error("an fqfn target requires a control plane, but none is configured")]
    NoControlPlane,
    #[error("failed to resolve runnable from control plane: {0}")]
    AppSource(#[from] AppSourceError),
}

/// The job type under which this Runner registers with the mesh and writes
/// its descriptor: the resolved Runnable's FQFN if known, else the target's
/// file stem (mirrors `config.go`'s `jobType` fallback).
pub fn job_type(target: &Target, runnable: Option<&Runnable>) -> String {
    if let Some(r) = runnable {
        return r.fqfn.to_string();
    }
    match target {
        Target::Fqfn(fqfn) => fqfn.to_string(),
        Target::Url(url) => file_stem(url),
        Target::Path(path) => {
            path.file_stem().and_then(|s| s.to_str()).unwrap_or("runnable").to_string()
        }
    }
}

fn file_stem(raw: &str) -> String {
    raw.rsplit('/').next().unwrap_or(raw).trim_end_matches(".wasm").to_string()
}

/// Resolves a [`Target`] into a [`Runnable`], fetching module bytes from
/// disk, over HTTP, or from an App Source, per `spec.md` §4.8 step 1.
pub async fn resolve_runnable(
    target: &Target,
    appsource: Option<&dyn constd_appsource::AppSource>,
    env_token: &str,
) -> Result<Runnable, ResolveError> {
    match target {
        Target::Path(path) => {
            let bytes = tokio::fs::read(path).await?;
            let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("runnable").to_string();
            Ok(Runnable {
                fqfn: Fqfn::new("local", "default", &name, "v1"),
                name,
                namespace: "default".to_string(),
                version: "v1".to_string(),
                module_bytes: Some(bytes),
                module_ref: None,
                capabilities: Default::default(),
            })
        }
        Target::Url(url) => {
            let bytes = reqwest::get(url).await?.bytes().await?.to_vec();
            let name = file_stem(url);
            Ok(Runnable {
                fqfn: Fqfn::new("remote", "default", &name, "v1"),
                name,
                namespace: "default".to_string(),
                version: "v1".to_string(),
                module_bytes: Some(bytes),
                module_ref: Some(url.clone()),
                capabilities: Default::default(),
            })
        }
        Target::Fqfn(fqfn) => {
            let appsource = appsource.ok_or(ResolveError::NoControlPlane)?;
            Ok(appsource.find_runnable(&fqfn.to_string(), env_token).await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_an_fqfn() {
        let target = Target::classify("com.acme#default::echo@v1");
        assert_eq!(target, Target::Fqfn(Fqfn::new("com.acme", "default", "echo", "v1")));
    }

    #[test]
    fn classifies_a_url() {
        assert_eq!(Target::classify("https://example.com/echo.wasm"), Target::Url("https://example.com/echo.wasm".to_string()));
    }

    #[test]
    fn classifies_anything_else_as_a_path() {
        assert_eq!(Target::classify("./echo.wasm"), Target::Path(PathBuf::from("./echo.wasm")));
    }

    #[test]
    fn job_type_falls_back_to_the_path_stem_without_a_resolved_runnable() {
        let target = Target::classify("/opt/functions/echo.wasm");
        assert_eq!(job_type(&target, None), "echo");
    }

    #[test]
    fn job_type_prefers_the_resolved_runnable_fqfn() {
        let target = Target::classify("/opt/functions/echo.wasm");
        let runnable = Runnable {
            name: "echo".to_string(),
            namespace: "default".to_string(),
            fqfn: Fqfn::new("com.acme", "default", "echo", "v1"),
            version: "v1".to_string(),
            module_bytes: None,
            module_ref: None,
            capabilities: Default::default(),
        };
        assert_eq!(job_type(&target, Some(&runnable)), "com.acme#default::echo@v1");
    }

    #[tokio::test]
    async fn resolving_a_path_reads_the_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("echo.wasm");
        std::fs::write(&path, b"\0asm").unwrap();

        let target = Target::classify(path.to_str().unwrap());
        let runnable = resolve_runnable(&target, None, "").await.unwrap();
        assert_eq!(runnable.module_bytes.as_deref(), Some(&b"\0asm"[..]));
    }

    #[tokio::test]
    async fn resolving_an_fqfn_without_a_control_plane_fails() {
        let target = Target::classify("com.acme#default::echo@v1");
        let err = resolve_runnable(&target, None, "").await.unwrap_err();
        assert!(matches!(err, ResolveError::NoControlPlane));
    }
}
