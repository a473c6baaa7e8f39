// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The Runner's self-descriptor watch (`spec.md` §4.8 step 7, §5 "one
//! descriptor-watch task per Runner"). Polls at 1 Hz; when the Supervisor
//! deletes the descriptor as its termination signal, this task raises
//! `SIGTERM` to the current process so the signal-intake task
//! (`signals.rs`) drives the same shutdown sequence a real SIGTERM would.

use std::time::Duration;

use constd_launcher::{DescriptorError, DescriptorStore};
use nix::sys::signal::{raise, Signal};
use uuid::Uuid;
use tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub async fn run(store: DescriptorStore, uuid: Uuid, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    // The first tick fires immediately; skip it so a descriptor written a
    // moment before this task starts isn't raced.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match store.find(&uuid) {
                    Ok(_) => {}
                    Err(DescriptorError::DescriptorMissing(_)) => {
                        tracing::warn!("descriptor missing, raising SIGTERM to self");
                        if let Err(e) = raise(Signal::SIGTERM) {
                            tracing::error!(error = %e, "failed to raise SIGTERM");
                        }
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to read own descriptor");
                    }
                }
            }
            _ = shutdown.cancelled() => break,
        }
    }
}
