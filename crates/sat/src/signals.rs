// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Signal intake: SIGINT/SIGTERM cancel the shared [`CancellationToken`]
//! that the Runner's lifecycle watches to begin its shutdown sequence
//! (`spec.md` §4.8 step 8). The descriptor monitor (`descriptor_monitor.rs`)
//! raises SIGTERM to this same process when its descriptor disappears, so
//! both triggers flow through one shutdown path.

use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

pub fn install() -> anyhow::Result<CancellationToken> {
    let token = CancellationToken::new();
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let cancel = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => tracing::warn!("received SIGINT, beginning shutdown"),
            _ = sigterm.recv() => tracing::warn!("received SIGTERM, beginning shutdown"),
        }
        cancel.cancel();
    });

    Ok(token)
}
