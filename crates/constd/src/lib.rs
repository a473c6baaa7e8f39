// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Wires the `constd-*` library crates into the Supervisor process: App
//! Source selection, the embedded control-plane server, remote-control-plane
//! registration, and the Reconciler's top-level run loop.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod cli;
pub mod control_plane_server;
pub mod env;
pub mod error;
pub mod signals;

use std::sync::Arc;

use constd_appsource::{AppSource, BundleSource, HttpClientSource};
use constd_core::SupervisorConfig;
use constd_engine::{EngineError, Reconciler};
use constd_launcher::DescriptorStore;
use tokio_util::sync::CancellationToken;

pub use error::RunError;

/// Runs the Supervisor to completion: selects and starts the App Source,
/// registers with a remote control plane if configured, then runs the
/// Reconciler until `shutdown` is cancelled.
pub async fn run(config: SupervisorConfig, shutdown: CancellationToken) -> Result<(), RunError> {
    let appsource: Arc<dyn AppSource> = if config.is_embedded_control_plane() {
        let bundle_path = config
            .bundle_path
            .clone()
            .ok_or(constd_core::ConfigError::Missing("bundle_path"))?;
        let bundle = Arc::new(BundleSource::load(&bundle_path).map_err(|e| {
            constd_core::ConfigError::Invalid { field: "bundle_path", value: e.to_string() }
        })?);

        control_plane_server::spawn(bundle.clone(), shutdown.clone()).await?;
        bundle
    } else {
        let client = HttpClientSource::new(config.control_plane.clone());
        client
            .start()
            .await
            .map_err(|e| RunError::AppSourceUnavailable(e.to_string()))?;

        let http_client = reqwest::Client::new();
        constd_appsource::register(
            &http_client,
            &config.control_plane,
            config.upstream_host.as_deref(),
            config.atmo_port,
        )
        .await?;

        Arc::new(client)
    };

    let descriptors = DescriptorStore::at_default_location();
    let (mut reconciler, mut errors) = Reconciler::new(config, appsource, descriptors);

    tokio::spawn(async move {
        while let Some(err) = errors.recv().await {
            log_engine_error(&err);
        }
    });

    reconciler.run(shutdown).await;
    Ok(())
}

/// §7's resolved policy: every `EngineError` variant is log-and-continue at
/// this layer (currently only `LaunchFailed`, since `MetricsUnavailable`
/// never leaves the `Watcher` as an error — it is folded into
/// `WatcherReport::failed_ports`).
fn log_engine_error(err: &EngineError) {
    match err {
        EngineError::LaunchFailed { target, source } => {
            tracing::warn!(target = %target, error = %source, "launch failed, will retry next tick");
        }
    }
}
