// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The Command Launcher: starts a child process with an inherited
//! environment plus a supplied overlay, returning a handle without blocking
//! on child exit. Termination is mediated entirely through the Process
//! Descriptor Store (see [`crate::descriptor_store`]), not through this
//! module — the Launcher never retains an in-process handle for kill-by-pid.

use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to launch command: {0}")]
    LaunchFailed(#[from] std::io::Error),
}

/// The result of a successful launch: an opaque UUID minted for this launch,
/// and the OS process id of the spawned child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchHandle {
    pub uuid: Uuid,
    pub pid: u32,
}

/// Starts `cmd` via a shell interpreter (so pipelines and variable expansion
/// render correctly), with `env_overlay` appended to the inherited parent
/// environment (later entries win on conflicting names). Stdout/stderr are
/// attached to this process's own stdout/stderr. Does not wait for the child
/// to exit.
pub fn run(cmd: &str, env_overlay: &[(String, String)]) -> Result<LaunchHandle, LaunchError> {
    tracing::debug!(cmd, "launching command");

    let mut command = Command::new("sh");
    command.arg("-c").arg(cmd);
    command.envs(env_overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::inherit());
    // The Launcher never awaits this child; it lives for as long as the
    // Supervisor does and is reaped by the OS at process exit.
    command.kill_on_drop(false);

    let child = command.spawn()?;
    let pid = child.id().ok_or_else(|| {
        LaunchError::LaunchFailed(std::io::Error::other("spawned child has no pid"))
    })?;

    // The child handle itself is deliberately dropped here: we do not retain
    // it for later kill-by-handle. Dropping does not kill the child because
    // `kill_on_drop(false)` was set above.
    std::mem::drop(child);

    Ok(LaunchHandle { uuid: Uuid::new_v4(), pid })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launches_and_returns_a_handle() {
        let handle = run("true", &[]).unwrap();
        assert!(handle.pid > 0);
    }

    #[test]
    fn mints_a_fresh_uuid_per_launch() {
        let a = run("true", &[]).unwrap();
        let b = run("true", &[]).unwrap();
        assert_ne!(a.uuid, b.uuid);
    }

    #[test]
    fn env_overlay_is_visible_to_the_child() {
        // The child echoes the overlay var to a temp file so we can assert on it
        // without capturing stdout (which is inherited, not piped, by design).
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("out.txt");
        let cmd = format!("echo \"$LAUNCH_TEST_VAR\" > {}", out_path.display());
        run(&cmd, &[("LAUNCH_TEST_VAR".to_string(), "hello".to_string())]).unwrap();

        // Give the shell a brief moment to flush; this is a best-effort smoke test.
        std::thread::sleep(std::time::Duration::from_millis(200));
        let contents = std::fs::read_to_string(&out_path).unwrap_or_default();
        assert_eq!(contents.trim(), "hello");
    }

    #[test]
    fn invalid_shell_still_spawns_and_surfaces_failure_via_exit_code() {
        // `sh -c` always spawns successfully; a bad command fails inside the
        // shell, not at spawn time, matching the teacher contract that
        // LaunchFailed means "could not start", not "exited non-zero".
        let handle = run("this-command-does-not-exist-xyz", &[]).unwrap();
        assert!(handle.pid > 0);
    }
}
