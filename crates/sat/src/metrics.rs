// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The Runner's `/meta/metrics` load signal: a count of currently-executing
//! module invocations, reported as `{scheduler: {total_thread_count}}`
//! (`spec.md` §4.8 step 4). This is the single number the Supervisor's
//! autoscaler reads per tick.

use std::sync::atomic::{AtomicU64, Ordering};

use constd_wire::{MetricsResponse, SchedulerMetrics};

/// Tracks in-flight module executions. Incremented on entry, decremented on
/// exit, around every call into a `ModuleRuntime` — from the HTTP handler
/// and from the mesh step handler alike.
#[derive(Debug, Default)]
pub struct ActiveExecutions(AtomicU64);

impl ActiveExecutions {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Marks one execution as started; returns a guard that marks it
    /// finished on drop, so panics or early returns still decrement.
    pub fn track(&self) -> ExecutionGuard<'_> {
        self.0.fetch_add(1, Ordering::SeqCst);
        ExecutionGuard { counter: &self.0 }
    }

    pub fn snapshot(&self) -> MetricsResponse {
        MetricsResponse { scheduler: SchedulerMetrics { total_thread_count: self.0.load(Ordering::SeqCst) } }
    }
}

pub struct ExecutionGuard<'a> {
    counter: &'a AtomicU64,
}

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let active = ActiveExecutions::new();
        assert_eq!(active.snapshot().scheduler.total_thread_count, 0);
    }

    #[test]
    fn tracking_increments_and_drop_decrements() {
        let active = ActiveExecutions::new();
        {
            let _guard = active.track();
            assert_eq!(active.snapshot().scheduler.total_thread_count, 1);
        }
        assert_eq!(active.snapshot().scheduler.total_thread_count, 0);
    }

    #[test]
    fn tracks_multiple_concurrent_executions() {
        let active = ActiveExecutions::new();
        let g1 = active.track();
        let g2 = active.track();
        assert_eq!(active.snapshot().scheduler.total_thread_count, 2);
        drop(g1);
        assert_eq!(active.snapshot().scheduler.total_thread_count, 1);
        drop(g2);
    }
}
