// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The embedded control-plane HTTP server (`spec.md` §4.4), started when the
//! Supervisor is acting as its own App Source (`control_plane ==
//! localhost:9090`). Binds eagerly so a port conflict is a startup error, but
//! serves in a background task so it doesn't block the reconcile loop.

use std::sync::Arc;

use constd_appsource::{router, BundleSource, ControlPlaneState};
use tokio_util::sync::CancellationToken;

use crate::error::RunError;

/// The fixed port the control plane listens on, per `spec.md` §3
/// (`control_plane == "localhost:9090"`).
const CONTROL_PLANE_PORT: u16 = 9090;

/// Binds the control-plane listener and spawns the serving task. Returns
/// once the socket is bound, so a bind failure surfaces synchronously to the
/// caller rather than being silently swallowed in the background task.
pub async fn spawn(bundle: Arc<BundleSource>, shutdown: CancellationToken) -> Result<(), RunError> {
    let addr = format!("0.0.0.0:{CONTROL_PLANE_PORT}");
    let listener =
        tokio::net::TcpListener::bind(&addr).await.map_err(RunError::ControlPlaneBind)?;

    let state = ControlPlaneState::new(bundle);
    let app = router(state);

    tracing::info!(addr, "serving embedded control plane");

    tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await;

        if let Err(e) = result {
            tracing::error!(error = %e, "control-plane server exited with an error");
        }
    });

    Ok(())
}
