// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The autoscaler decision table as a pure function, testable without
//! spawning anything (`spec.md` §4.7.2).

use crate::watcher::WatcherReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDecision {
    Launch,
    AtCeiling,
    NoChange,
    ScaleDown,
}

/// `threshold = min(NumCPU/2, 8)`, `ceiling = NumCPU`, evaluated against an
/// optional `WatcherReport`. Rules are evaluated in order; the first match
/// wins, exactly mirroring the table in `spec.md` §4.7.2.
pub fn decide(report: Option<&WatcherReport>, threshold: usize, ceiling: usize) -> ScaleDecision {
    let Some(report) = report else { return ScaleDecision::Launch };

    if report.inst_count == 0 {
        return ScaleDecision::Launch;
    }

    let average = report.total_threads as usize / report.inst_count;

    if average >= threshold {
        return if report.inst_count >= ceiling { ScaleDecision::AtCeiling } else { ScaleDecision::Launch };
    }

    if report.inst_count == 1 {
        ScaleDecision::NoChange
    } else {
        ScaleDecision::ScaleDown
    }
}

/// `threshold = min(NumCPU/2, 8)`.
pub fn threshold_for(num_cpus: usize) -> usize {
    (num_cpus / 2).min(8)
}
