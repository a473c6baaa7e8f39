// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Ties every Runner module together into the external contract described
//! in `spec.md` §4.8: resolve config, write the descriptor, serve HTTP,
//! join the mesh, monitor the descriptor, and run the shutdown sequence on
//! cancellation. Grounded in `original_source/sat/sat.go`'s `New`/`Start`
//! and `signals.go`'s shutdown ordering.

use std::sync::Arc;
use std::time::Duration;

use constd_appsource::{AppSource, HttpClientSource};
use constd_launcher::DescriptorStore;
use constd_wire::ProcessDescriptor;
use tokio_util::sync::CancellationToken;

use crate::config::{job_type, resolve_runnable, RunnerConfig, Target};
use crate::error::RunnerError;
use crate::runtime::{LoggingStubRuntime, ModuleRuntime};
use crate::server::{self, AppState};
use crate::{descriptor_monitor, mesh, stdin_mode};

/// Mesh drain window between withdrawing and stopping the mesh transport
/// (`spec.md` §4.8 step 8, §9 design note: fixed at 3s so peers have time
/// to stop addressing this node before the socket closes).
const MESH_DRAIN: Duration = Duration::from_secs(3);

/// Bounded context for the final HTTP server stop (`spec.md` §5: "4s
/// server-drain").
const SERVER_DRAIN: Duration = Duration::from_secs(4);

pub struct Runner {
    config: RunnerConfig,
    descriptors: DescriptorStore,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config, descriptors: DescriptorStore::at_default_location() }
    }

    pub async fn run(self, shutdown: CancellationToken) -> Result<(), RunnerError> {
        let target = Target::classify(&self.config.target);

        let appsource: Option<Arc<dyn AppSource>> = match &self.config.control_plane {
            Some(control_plane) => {
                let client = HttpClientSource::new(control_plane.clone());
                client.start().await.map_err(|e| RunnerError::AppSourceUnavailable(e.to_string()))?;
                Some(Arc::new(client))
            }
            None => None,
        };

        let runnable =
            resolve_runnable(&target, appsource.as_deref(), &self.config.env_token).await?;
        let job_type = job_type(&target, Some(&runnable));

        let runtime: Arc<dyn ModuleRuntime> = Arc::new(LoggingStubRuntime);

        if self.config.use_stdin {
            return stdin_mode::run(runtime).await.map_err(RunnerError::from);
        }

        self.descriptors
            .write(&self.config.uuid, &ProcessDescriptor::new(self.config.http_port, job_type.clone()))?;

        let state = AppState::new(runtime, job_type);

        let listener = tokio::net::TcpListener::bind(("0.0.0.0", self.config.http_port))
            .await
            .map_err(RunnerError::Bind)?;

        let server_shutdown = CancellationToken::new();
        let server_shutdown_for_task = server_shutdown.clone();
        let app = server::router(state.clone());
        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { server_shutdown_for_task.cancelled().await })
                .await
        });

        mesh::connect_static_peers(self.config.peers.clone(), state.mesh.clone()).await;

        let monitor_handle = tokio::spawn(descriptor_monitor::run(
            self.descriptors.clone(),
            self.config.uuid,
            shutdown.clone(),
        ));

        shutdown.cancelled().await;
        tracing::info!("shutting down: withdrawing from mesh");
        state.mesh.withdraw();

        tokio::time::sleep(MESH_DRAIN).await;
        tracing::info!("shutting down: mesh drained, stopping");

        let _ = self.descriptors.delete(&self.config.uuid);
        server_shutdown.cancel();

        if tokio::time::timeout(SERVER_DRAIN, server_handle).await.is_err() {
            tracing::warn!("http server did not stop within the drain budget");
        }
        monitor_handle.abort();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use uuid::Uuid;

    use super::*;

    fn config(target: &str, http_port: u16) -> RunnerConfig {
        RunnerConfig {
            target: target.to_string(),
            use_stdin: false,
            http_port,
            control_plane: None,
            env_token: String::new(),
            runnable_ident: None,
            runnable_version: None,
            uuid: Uuid::new_v4(),
            peers: Vec::new(),
            tracer_config: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn run_writes_a_descriptor_and_exits_cleanly_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("echo.wasm");
        std::fs::write(&path, b"\0asm").unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let runner = Runner::new(config(path.to_str().unwrap(), port));
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        let handle = tokio::spawn(async move { runner.run(shutdown_clone).await });
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();

        let result = tokio::time::timeout(Duration::from_secs(10), handle).await;
        assert!(result.is_ok(), "runner did not shut down within the timeout");
        assert!(result.unwrap().unwrap().is_ok());
    }

    #[tokio::test]
    async fn run_with_stdin_mode_never_binds_a_listener_or_writes_a_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("echo.wasm");
        std::fs::write(&path, b"\0asm").unwrap();

        let mut cfg = config(path.to_str().unwrap(), 0);
        cfg.use_stdin = true;
        let runner = Runner::new(cfg);

        let shutdown = CancellationToken::new();
        let result = runner.run(shutdown).await;
        assert!(result.is_ok());
    }
}
