// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The normalized request/response envelope passed to the WebAssembly module,
//! and the function-chain sequence carried alongside it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The normalized request handed to the WebAssembly host for execution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoordinatedRequest {
    pub method: String,
    pub url: String,
    pub id: String,
    #[serde(default)]
    pub body: Vec<u8>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub resp_headers: HashMap<String, String>,
    #[serde(default)]
    pub params: HashMap<String, String>,
    #[serde(default)]
    pub state: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub sequence_json: String,
}

/// The normalized response handed back from the WebAssembly host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoordinatedResponse {
    #[serde(default)]
    pub output: Vec<u8>,
    #[serde(default)]
    pub resp_headers: HashMap<String, String>,
}

/// An application error surfaced by the WebAssembly module (never fatal).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunErr {
    pub code: i32,
    pub message: String,
}

impl RunErr {
    /// A `RunErr` with both fields at their zero value means "no error",
    /// matching the Go original's `runErr.Code != 0 || runErr.Message != ""` check.
    pub fn is_present(&self) -> bool {
        self.code != 0 || !self.message.is_empty()
    }
}

/// One step in a function chain's sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub fqfn: String,
    /// Stable per-callable identifier used to match downstream results to
    /// invocations; must be preserved across re-implementations.
    pub key: String,
    #[serde(default)]
    pub completed: bool,
}

/// The ordered list of function-chain steps carried alongside a
/// `CoordinatedRequest`, serialized into `sequence_json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sequence {
    pub steps: Vec<Step>,
}

impl Sequence {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(s)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The first step not yet marked completed, skipping already-completed steps.
    pub fn next_step(&self) -> Option<&Step> {
        self.steps.iter().find(|s| !s.completed)
    }

    pub fn next_step_mut(&mut self) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| !s.completed)
    }
}

/// The result of executing one function-chain step, published as an
/// `atmo.fnresult` mesh message (parent id = request id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FnResult {
    pub fqfn: String,
    pub key: String,
    pub response: CoordinatedResponse,
    #[serde(default)]
    pub run_err: RunErr,
    #[serde(default)]
    pub exec_err: String,
}

impl FnResult {
    pub fn has_exec_err(&self) -> bool {
        !self.exec_err.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_err_zero_value_is_absent() {
        assert!(!RunErr::default().is_present());
        assert!(RunErr { code: 404, message: String::new() }.is_present());
        assert!(RunErr { code: 0, message: "boom".to_string() }.is_present());
    }

    #[test]
    fn sequence_next_step_skips_completed() {
        let seq = Sequence {
            steps: vec![
                Step { fqfn: "a".to_string(), key: "k1".to_string(), completed: true },
                Step { fqfn: "b".to_string(), key: "k2".to_string(), completed: false },
            ],
        };
        assert_eq!(seq.next_step().unwrap().fqfn, "b");
    }

    #[test]
    fn sequence_next_step_is_none_when_all_completed() {
        let seq = Sequence {
            steps: vec![Step { fqfn: "a".to_string(), key: "k1".to_string(), completed: true }],
        };
        assert!(seq.next_step().is_none());
    }

    #[test]
    fn sequence_round_trips_through_json() {
        let seq = Sequence {
            steps: vec![Step { fqfn: "a".to_string(), key: "k1".to_string(), completed: false }],
        };
        let json = seq.to_json().unwrap();
        let back = Sequence::from_json(&json).unwrap();
        assert_eq!(back.steps.len(), 1);
        assert_eq!(back.steps[0].fqfn, "a");
    }

    #[test]
    fn empty_sequence_json_parses_to_empty_sequence() {
        let seq = Sequence::from_json("").unwrap();
        assert!(seq.steps.is_empty());
    }
}
