// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! `--stdin` mode (`spec.md` §6): read one line from standard input,
//! execute the module with it as a synthetic `POST /`, print the response
//! body to standard output, then exit without starting the HTTP server or
//! joining the mesh.

use std::sync::Arc;

use constd_wire::CoordinatedRequest;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use uuid::Uuid;

use crate::runtime::{ModuleRunError, ModuleRuntime};

#[derive(Debug, Error)]
pub enum StdinError {
    #[error("failed to read from stdin or write to stdout: {0}")]
    Io(#[from] std::io::Error),
    #[error("module execution failed: {0}")]
    Run(#[from] ModuleRunError),
}

pub async fn run(runtime: Arc<dyn ModuleRuntime>) -> Result<(), StdinError> {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();
    reader.read_line(&mut line).await?;
    let body = line.trim_end_matches('\n').as_bytes().to_vec();

    let req = CoordinatedRequest {
        method: "POST".to_string(),
        url: "/".to_string(),
        id: Uuid::new_v4().to_string(),
        body,
        ..Default::default()
    };

    let resp = runtime.execute(req).await?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(&resp.output).await?;
    stdout.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use constd_wire::{CoordinatedResponse, RunErr};

    use super::*;
    use crate::runtime::LoggingStubRuntime;

    #[tokio::test]
    async fn echoes_the_stub_runtimes_response() {
        let result = run(Arc::new(LoggingStubRuntime)).await;
        assert!(result.is_ok());
    }

    struct FailingRuntime;

    #[async_trait]
    impl ModuleRuntime for FailingRuntime {
        async fn execute(&self, _req: CoordinatedRequest) -> Result<CoordinatedResponse, ModuleRunError> {
            Err(ModuleRunError::Run(RunErr { code: 2, message: "bad input".to_string() }))
        }
    }

    #[tokio::test]
    async fn a_run_error_propagates_as_a_runnable_error() {
        let err = run(Arc::new(FailingRuntime)).await.unwrap_err();
        assert!(matches!(err, StdinError::Run(ModuleRunError::Run(_))));
    }
}
