// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The function-chain step protocol (`spec.md` §4.9), as pure data
//! transformation separated from the mesh transport that carries it.
//! Grounded directly in `original_source/sat/meshed.go`'s
//! `handleFnResult`/`sendFnResult`/`sendNextStep`: this module is the
//! "figure out what happened and what comes next" half; `mesh.rs` owns
//! actually publishing the result and tunneling the next message.

use constd_wire::{CoordinatedRequest, CoordinatedResponse, FnResult, RunErr, Sequence};
use thiserror::Error;

use crate::runtime::ModuleRunError;

#[derive(Debug, Error)]
pub enum StepError {
    #[error("sequence_json did not parse: {0}")]
    MalformedSequence(#[from] serde_json::Error),
    #[error("sequence has no remaining (uncompleted) step")]
    NoNextStep,
}

/// The outcome of handling one step: the `FnResult` to publish as
/// `atmo.fnresult`, and — if execution did not fail with an opaque error and
/// another step remains — the next message to tunnel.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub fn_result: FnResult,
    pub next_message: Option<NextMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NextMessage {
    pub fqfn: String,
    pub request: CoordinatedRequest,
}

/// Handles one step's execution result, per `spec.md` §4.9 steps 2-5.
///
/// `fqfn` is this node's own FQFN (`msg.Type()` in the original — the step
/// message's type is the FQFN that was just executed). `req` carries the
/// `sequence_json` to advance.
pub fn handle_fn_result(
    fqfn: &str,
    mut req: CoordinatedRequest,
    exec_result: Result<CoordinatedResponse, ModuleRunError>,
) -> Result<StepOutcome, StepError> {
    let mut seq = Sequence::from_json(&req.sequence_json)?;

    let key = {
        let step = seq.next_step_mut().ok_or(StepError::NoNextStep)?;
        step.completed = true;
        step.key.clone()
    };

    let (response, run_err, exec_err) = match exec_result {
        Ok(resp) => (resp, RunErr::default(), String::new()),
        Err(ModuleRunError::Run(run_err)) => (CoordinatedResponse::default(), run_err, String::new()),
        Err(ModuleRunError::Exec(msg)) => (CoordinatedResponse::default(), RunErr::default(), msg),
    };

    let fn_result = FnResult { fqfn: fqfn.to_string(), key, response, run_err, exec_err };

    if fn_result.has_exec_err() {
        // Chain progression stops on this node; no next message is tunneled.
        return Ok(StepOutcome { fn_result, next_message: None });
    }

    req.sequence_json = seq.to_json()?;

    let next_message = seq
        .next_step()
        .map(|next| NextMessage { fqfn: next.fqfn.clone(), request: req.clone() });

    Ok(StepOutcome { fn_result, next_message })
}
