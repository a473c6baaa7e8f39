// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The on-disk Process Descriptor: `{port, job_type}`, keyed by instance UUID.
//!
//! This is a cross-process rendezvous: its *existence* is a liveness token,
//! and its *deletion* is the termination command from Supervisor to Runner.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    pub port: u16,
    pub job_type: String,
}

impl ProcessDescriptor {
    pub fn new(port: u16, job_type: impl Into<String>) -> Self {
        Self { port, job_type: job_type.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_json_object() {
        let d = ProcessDescriptor::new(10234, "com.acme#default::echo@v1");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["port"], 10234);
        assert_eq!(json["job_type"], "com.acme#default::echo@v1");
    }

    #[test]
    fn round_trips_through_json() {
        let d = ProcessDescriptor::new(12000, "echo");
        let s = serde_json::to_string(&d).unwrap();
        let back: ProcessDescriptor = serde_json::from_str(&s).unwrap();
        assert_eq!(back, d);
    }
}
