// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Signal intake: SIGINT/SIGTERM cancel the shared [`CancellationToken`]
//! that the Reconciler watches to begin cooperative shutdown (`spec.md` §5).

use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;

/// Spawns the one signal-handling task (`spec.md` §5's "one signal-handling
/// task subscribed to SIGINT/SIGTERM") and returns a token it cancels on
/// receipt of either signal.
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
