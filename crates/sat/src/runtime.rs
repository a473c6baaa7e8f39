// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The `ModuleRuntime` seam: the WebAssembly host is an external
//! collaborator (`spec.md` §1), out of scope here, but the Runner needs a
//! concrete boundary to execute against. `LoggingStubRuntime` is the default
//! and test implementation; a real wasmtime/wasmer-backed runtime is left
//! unbuilt, matching the non-goal of specifying the WebAssembly engine
//! itself.

use async_trait::async_trait;
use constd_wire::{CoordinatedRequest, CoordinatedResponse, RunErr};

/// A module execution failure: either an application-level `RunErr`
/// (surfaced to the caller as a mapped HTTP status, never fatal) or an
/// opaque execution error (serialized as a string into `FnResult.exec_err`
/// and, in the mesh, halts chain progression at this node).
#[derive(Debug, Clone)]
pub enum ModuleRunError {
    Run(RunErr),
    Exec(String),
}

impl std::fmt::Display for ModuleRunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleRunError::Run(e) => write!(f, "run error {}: {}", e.code, e.message),
            ModuleRunError::Exec(e) => write!(f, "execution error: {e}"),
        }
    }
}

impl std::error::Error for ModuleRunError {}

/// The seam between the Runner's HTTP/mesh surface and the WebAssembly
/// execution engine.
#[async_trait]
pub trait ModuleRuntime: Send + Sync {
    async fn execute(&self, req: CoordinatedRequest) -> Result<CoordinatedResponse, ModuleRunError>;
}

/// Echoes the request body back as the response body. Used by default and
/// in every test in this crate: it exercises the full HTTP/mesh/metrics
/// surface without depending on a real WebAssembly engine.
#[derive(Debug, Default)]
pub struct LoggingStubRuntime;

#[async_trait]
impl ModuleRuntime for LoggingStubRuntime {
    async fn execute(&self, req: CoordinatedRequest) -> Result<CoordinatedResponse, ModuleRunError> {
        tracing::debug!(id = %req.id, method = %req.method, url = %req.url, "executing (stub runtime)");
        Ok(CoordinatedResponse { output: req.body, resp_headers: req.resp_headers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_runtime_echoes_the_request_body() {
        let runtime = LoggingStubRuntime;
        let req = CoordinatedRequest { body: b"hello".to_vec(), ..Default::default() };
        let resp = runtime.execute(req).await.unwrap();
        assert_eq!(resp.output, b"hello");
    }

    #[test]
    fn module_run_error_displays_its_kind() {
        let run = ModuleRunError::Run(RunErr { code: 404, message: "not found".to_string() });
        assert_eq!(run.to_string(), "run error 404: not found");

        let exec = ModuleRunError::Exec("boom".to_string());
        assert_eq!(exec.to_string(), "execution error: boom");
    }
}
