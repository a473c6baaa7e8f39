// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The Instance Pool ("Watcher"): per-FQFN bookkeeping of Runner instances,
//! metrics aggregation, and instance termination.

use std::collections::HashMap;
use std::time::Duration;

use constd_launcher::DescriptorStore;
use uuid::Uuid;

use crate::metrics_client::MetricsClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instance {
    pub uuid: Uuid,
    pub pid: u32,
    /// The `total_thread_count` last reported by this instance's metrics
    /// endpoint, or `None` if it has never reported successfully. Used by
    /// [`Watcher::scale_down`] to prefer terminating the least-loaded
    /// instance rather than an arbitrary one (an intentional improvement
    /// over the source's arbitrary iteration-order pick; see `DESIGN.md`).
    pub last_total_threads: Option<u64>,
}

/// A read-only snapshot produced by [`Watcher::report`].
///
/// `inst_count` counts only instances whose metrics call succeeded this
/// tick; `failed_ports` lists the rest. `inst_count + failed_ports.len() ==
/// pool size` holds for any tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherReport {
    pub inst_count: usize,
    pub total_threads: u64,
    pub failed_ports: Vec<u16>,
}

/// Per-FQFN bookkeeping of Runner instances. The reconcile task is the sole
/// owner and sole writer of a `Watcher`; no locking is required on its
/// internal map (see `SPEC_FULL.md` §5).
/// The Supervisor's top-level wait for a terminated instance to exit before
/// escalating to `SIGTERM`/`SIGKILL` (`spec.md` §5's "bounded grace timer,
/// default 5s").
pub const DEFAULT_TERMINATION_GRACE: Duration = Duration::from_secs(5);

pub struct Watcher {
    label: String,
    instances: HashMap<u16, Instance>,
    metrics: MetricsClient,
    descriptors: DescriptorStore,
    termination_grace: Duration,
}

impl Watcher {
    pub fn new(label: impl Into<String>, descriptors: DescriptorStore) -> Self {
        Self {
            label: label.into(),
            instances: HashMap::new(),
            metrics: MetricsClient::new(),
            descriptors,
            termination_grace: DEFAULT_TERMINATION_GRACE,
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn with_termination_grace(mut self, grace: Duration) -> Self {
        self.termination_grace = grace;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Insert a newly-launched instance. Assumes it is already running.
    pub fn add(&mut self, port: u16, uuid: Uuid, pid: u32) {
        self.instances.insert(port, Instance { uuid, pid, last_total_threads: None });
    }

    /// Poll every member's metrics endpoint and summarize. Returns `None`
    /// when the pool is empty.
    pub async fn report(&mut self) -> Option<WatcherReport> {
        if self.instances.is_empty() {
            return None;
        }

        let mut total_threads = 0u64;
        let mut failed_ports = Vec::new();
        let mut inst_count = 0usize;
        let ports: Vec<u16> = self.instances.keys().copied().collect();

        for port in ports {
            match self.metrics.report(port).await {
                Ok(m) => {
                    total_threads += m.total_thread_count;
                    inst_count += 1;
                    if let Some(instance) = self.instances.get_mut(&port) {
                        instance.last_total_threads = Some(m.total_thread_count);
                    }
                }
                Err(e) => {
                    tracing::warn!(fqfn = %self.label, port, error = %e, "failed to fetch metrics");
                    failed_ports.push(port);
                }
            }
        }

        Some(WatcherReport { inst_count, total_threads, failed_ports })
    }

    /// Select the least-loaded instance (by last-reported
    /// `total_thread_count`, with instances that have never reported treated
    /// as most-loaded so a known-idle instance is always preferred) and
    /// terminate it. A no-op if the pool is empty.
    pub async fn scale_down(&mut self) {
        let Some(&port) = self
            .instances
            .iter()
            .min_by_key(|(_, instance)| instance.last_total_threads.unwrap_or(u64::MAX))
            .map(|(port, _)| port)
        else {
            return;
        };
        tracing::info!(fqfn = %self.label, port, "scaling down, terminating least-loaded instance");
        self.terminate_instance(port).await;
    }

    /// Remove the entry and terminate it via the descriptor-delete protocol.
    /// Idempotent with respect to a missing port.
    pub async fn terminate_instance(&mut self, port: u16) {
        let Some(instance) = self.instances.remove(&port) else { return };

        if let Err(e) = constd_launcher::terminate_instance(
            &self.descriptors,
            &instance.uuid,
            instance.pid,
            self.termination_grace,
        )
        .await
        {
            tracing::warn!(fqfn = %self.label, port, error = %e, "failed to terminate instance");
            return;
        }

        tracing::info!(fqfn = %self.label, port, "successfully terminated instance");
    }

    /// Terminate every member. Best-effort: logs individual failures but
    /// does not abort the sweep.
    pub async fn terminate(&mut self) {
        let ports: Vec<u16> = self.instances.keys().copied().collect();
        for port in ports {
            self.terminate_instance(port).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, DescriptorStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DescriptorStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn report_is_none_for_an_empty_pool() {
        let (_dir, store) = store();
        let mut watcher = Watcher::new("test", store);
        assert!(watcher.report().await.is_none());
    }

    #[tokio::test]
    async fn report_counts_failed_ports_when_nothing_is_listening() {
        let (_dir, store) = store();
        let mut watcher = Watcher::new("test", store);
        watcher.add(1, Uuid::new_v4(), 99999);

        let report = watcher.report().await.unwrap();
        assert_eq!(report.inst_count, 0);
        assert_eq!(report.failed_ports, vec![1]);
    }

    #[tokio::test]
    async fn scale_down_prefers_the_least_loaded_instance() {
        let (_dir, store) = store();
        let mut watcher =
            Watcher::new("test", store.clone()).with_termination_grace(Duration::from_millis(10));
        let uuid_a = Uuid::new_v4();
        let uuid_b = Uuid::new_v4();
        store.write(&uuid_a, &constd_wire::ProcessDescriptor::new(1, "a")).unwrap();
        store.write(&uuid_b, &constd_wire::ProcessDescriptor::new(2, "b")).unwrap();
        watcher.add(1, uuid_a, 999_990);
        watcher.add(2, uuid_b, 999_991);
        watcher.instances.get_mut(&1).unwrap().last_total_threads = Some(10);
        watcher.instances.get_mut(&2).unwrap().last_total_threads = Some(2);

        watcher.scale_down().await;

        assert_eq!(watcher.len(), 1);
        assert!(watcher.instances.contains_key(&1));
        assert!(!watcher.instances.contains_key(&2));
    }

    #[tokio::test]
    async fn scale_down_is_a_no_op_on_an_empty_pool() {
        let (_dir, store) = store();
        let mut watcher = Watcher::new("test", store);
        watcher.scale_down().await;
        assert!(watcher.is_empty());
    }

    #[tokio::test]
    async fn terminate_instance_removes_the_entry_and_deletes_the_descriptor() {
        let (_dir, store) = store();
        let uuid = Uuid::new_v4();
        store.write(&uuid, &constd_wire::ProcessDescriptor::new(1234, "echo")).unwrap();

        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();

        let mut watcher =
            Watcher::new("test", store.clone()).with_termination_grace(Duration::from_millis(10));
        watcher.add(1234, uuid, pid);
        watcher.terminate_instance(1234).await;

        assert!(watcher.is_empty());
        assert!(store.find(&uuid).is_err());

        let _ = child.kill();
        let _ = child.wait();
    }
}
