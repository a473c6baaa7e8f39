// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The Command Launcher and Process Descriptor Store: starting Runner/proxy
//! child processes and mediating their termination through the descriptor
//! file as a liveness token.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod command;
pub mod descriptor_store;
pub mod launcher;
pub mod termination;

pub use command::{random_port, render_atmo_command, render_sat_command};
pub use descriptor_store::{default_store_dir, DescriptorError, DescriptorStore};
pub use launcher::{run, LaunchError, LaunchHandle};
pub use termination::{send_sigkill, send_sigterm, TerminationError};

use std::time::Duration;

use uuid::Uuid;

/// Terminate an instance by deleting its descriptor, then escalating to
/// `SIGTERM` and finally `SIGKILL` if it has not exited within `grace`.
///
/// This is the Supervisor-side half of the termination protocol described in
/// `spec.md` §4.2: deletion is the primary signal; direct signals are the
/// bounded-time fallback, not the normal path.
pub async fn terminate_instance(
    store: &DescriptorStore,
    uuid: &Uuid,
    pid: u32,
    grace: Duration,
) -> Result<(), DescriptorError> {
    store.delete(uuid)?;

    tokio::time::sleep(grace).await;

    if process_is_alive(pid) {
        tracing::warn!(pid, "instance did not exit within grace period, sending SIGTERM");
        let _ = send_sigterm(pid);
        tokio::time::sleep(grace).await;
    }

    if process_is_alive(pid) {
        tracing::warn!(pid, "instance still alive after SIGTERM, sending SIGKILL");
        let _ = send_sigkill(pid);
    }

    Ok(())
}

fn process_is_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn terminate_instance_deletes_the_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let store = DescriptorStore::new(dir.path());
        let uuid = Uuid::new_v4();
        store.write(&uuid, &constd_wire::ProcessDescriptor::new(1, "x")).unwrap();

        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();

        terminate_instance(&store, &uuid, pid, Duration::from_millis(10)).await.unwrap();

        assert!(matches!(
            store.find(&uuid).unwrap_err(),
            descriptor_store::DescriptorError::DescriptorMissing(_)
        ));

        let _ = child.kill();
        let _ = child.wait();
    }
}
