// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Forced termination as a last resort when descriptor deletion alone does
//! not cause a Runner to exit within a bounded wait.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TerminationError {
    #[error("failed to signal pid {pid}: {source}")]
    Signal { pid: u32, source: nix::Error },
}

/// Send `SIGTERM` to `pid`. Best-effort: a process that has already exited
/// (ESRCH) is not an error from the caller's point of view.
pub fn send_sigterm(pid: u32) -> Result<(), TerminationError> {
    send_signal(pid, Signal::SIGTERM)
}

/// Send `SIGKILL` to `pid`, for use once the graceful-shutdown budget has
/// elapsed.
pub fn send_sigkill(pid: u32) -> Result<(), TerminationError> {
    send_signal(pid, Signal::SIGKILL)
}

fn send_signal(pid: u32, signal: Signal) -> Result<(), TerminationError> {
    match signal::kill(Pid::from_raw(pid as i32), signal) {
        Ok(()) => Ok(()),
        Err(nix::Error::ESRCH) => Ok(()),
        Err(source) => Err(TerminationError::Signal { pid, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signaling_a_nonexistent_pid_is_not_an_error() {
        // A pid vanishingly unlikely to be in use.
        send_sigterm(999_999).unwrap();
        send_sigkill(999_999).unwrap();
    }

    #[test]
    fn sigterm_reaches_a_real_child() {
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();
        send_sigterm(pid).unwrap();
        let status = child.wait().unwrap();
        assert!(!status.success());
    }
}
