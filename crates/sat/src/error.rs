// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Top-level fatal error kinds for the Runner binary and their exit codes
//! (`spec.md` §6: `0` success, `1` runtime error, `2` runnable error).

use thiserror::Error;

use crate::config::ResolveError;
use crate::stdin_mode::StdinError;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("app source unavailable after retrying: {0}")]
    AppSourceUnavailable(String),
    #[error("failed to resolve the runnable: {0}")]
    Resolve(#[from] ResolveError),
    #[error("descriptor error: {0}")]
    Descriptor(#[from] constd_launcher::DescriptorError),
    #[error("failed to bind http listener: {0}")]
    Bind(#[source] std::io::Error),
    #[error("stdin mode failed: {0}")]
    Stdin(#[from] StdinError),
}

impl RunnerError {
    /// `2` for a problem with the Runnable itself; `1` for everything else.
    /// Mirrors `original_source/sat/exit_code.go`'s `RuntimeError`/`RunnableError`.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunnerError::Resolve(_) => 2,
            RunnerError::Stdin(StdinError::Run(_)) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_resolve_error_is_a_runnable_error() {
        let err = RunnerError::Resolve(ResolveError::NoControlPlane);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn everything_else_is_a_runtime_error() {
        let err = RunnerError::AppSourceUnavailable("down".to_string());
        assert_eq!(err.exit_code(), 1);
    }
}
