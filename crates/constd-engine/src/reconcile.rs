// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The Reconciler: the single writer for Watcher state and the only
//! orchestrator of launches (`spec.md` §4.7).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use constd_appsource::AppSource;
use constd_core::{Fqfn, SupervisorConfig};
use constd_launcher::{command, descriptor_store::DescriptorStore, launcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::autoscale::{decide, threshold_for, ScaleDecision};
use crate::watcher::Watcher;

/// Non-fatal errors surfaced by the reconcile loop. Per `spec.md` §7 this is
/// the only error kind that travels the reconcile loop's error channel
/// rather than being fatal at startup or self-contained in a `Watcher`
/// report: `LaunchFailed` is logged and the tick continues.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("launch failed for {target}: {source}")]
    LaunchFailed { target: String, source: launcher::LaunchError },
}

enum LaunchTarget {
    Proxy,
    Sat(Fqfn),
}

impl std::fmt::Display for LaunchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchTarget::Proxy => write!(f, "atmo proxy"),
            LaunchTarget::Sat(fqfn) => write!(f, "{fqfn}"),
        }
    }
}

struct LaunchOutcome {
    target: LaunchTarget,
    port: u16,
    uuid: Uuid,
    pid: u32,
}

pub struct Reconciler {
    config: SupervisorConfig,
    appsource: Arc<dyn AppSource>,
    descriptors: DescriptorStore,
    proxy: Watcher,
    constellation: HashMap<Fqfn, Watcher>,
    launch_tx: mpsc::UnboundedSender<LaunchOutcome>,
    launch_rx: mpsc::UnboundedReceiver<LaunchOutcome>,
    error_tx: mpsc::UnboundedSender<EngineError>,
}

impl Reconciler {
    pub fn new(
        config: SupervisorConfig,
        appsource: Arc<dyn AppSource>,
        descriptors: DescriptorStore,
    ) -> (Self, mpsc::UnboundedReceiver<EngineError>) {
        let (launch_tx, launch_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        let reconciler = Self {
            proxy: Watcher::new("atmo", descriptors.clone()),
            constellation: HashMap::new(),
            config,
            appsource,
            descriptors,
            launch_tx,
            launch_rx,
            error_tx,
        };

        (reconciler, error_rx)
    }

    /// Run forever: each iteration does (i) launch-callback drain, (ii)
    /// shutdown check, (iii) `reconcile_proxy`, (iv) `reconcile_constellation`,
    /// then sleeps one second. On cancellation, terminates every Watcher
    /// (proxy last) before returning.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        loop {
            self.drain_launch_callbacks();

            if shutdown.is_cancelled() {
                break;
            }

            self.reconcile_proxy().await;
            self.reconcile_constellation().await;

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(1)) => {}
                _ = shutdown.cancelled() => break,
            }
        }

        for watcher in self.constellation.values_mut() {
            watcher.terminate().await;
        }
        self.proxy.terminate().await;
    }

    fn drain_launch_callbacks(&mut self) {
        while let Ok(outcome) = self.launch_rx.try_recv() {
            match outcome.target {
                LaunchTarget::Proxy => self.proxy.add(outcome.port, outcome.uuid, outcome.pid),
                LaunchTarget::Sat(fqfn) => {
                    self.constellation
                        .entry(fqfn.clone())
                        .or_insert_with(|| Watcher::new(fqfn.to_string(), self.descriptors.clone()))
                        .add(outcome.port, outcome.uuid, outcome.pid);
                }
            }
        }
    }

    /// §4.7.1: exactly one proxy instance is maintained.
    async fn reconcile_proxy(&mut self) {
        if self.proxy.report().await.is_some() {
            return;
        }

        tracing::info!("launching atmo proxy");
        let port = self.config.atmo_port;
        let cmd = command::render_atmo_command(&self.config);

        let mut overlay = vec![
            ("ATMO_HTTP_PORT".to_string(), port.to_string()),
            ("ATMO_CONTROL_PLANE".to_string(), self.config.control_plane.clone()),
            ("ATMO_ENV_TOKEN".to_string(), self.config.env_token.clone()),
        ];
        if self.config.headless {
            overlay.push(("ATMO_HEADLESS".to_string(), "true".to_string()));
        }

        self.spawn_launch(LaunchTarget::Proxy, cmd, port, overlay);
    }

    /// §4.7.2: the autoscaler.
    async fn reconcile_constellation(&mut self) {
        let num_cpus = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let threshold = threshold_for(num_cpus);
        let ceiling = num_cpus;

        let applications = self.appsource.applications().await;
        for app in applications {
            let runnables = self.appsource.runnables(&app.identifier, &app.app_version).await;
            for runnable in runnables {
                let fqfn = runnable.fqfn.clone();
                let watcher = self
                    .constellation
                    .entry(fqfn.clone())
                    .or_insert_with(|| Watcher::new(fqfn.to_string(), self.descriptors.clone()));

                let report = watcher.report().await;
                let decision = decide(report.as_ref(), threshold, ceiling);

                match decision {
                    ScaleDecision::Launch => {
                        tracing::warn!(fqfn = %fqfn, "launching");
                        let port = command::random_port();
                        let cmd = command::render_sat_command(&self.config, &fqfn, port);
                        let overlay = vec![
                            ("SAT_HTTP_PORT".to_string(), port.to_string()),
                            ("SAT_ENV_TOKEN".to_string(), self.config.env_token.clone()),
                            ("SAT_CONTROL_PLANE".to_string(), self.config.control_plane.clone()),
                        ];
                        self.spawn_launch(LaunchTarget::Sat(fqfn.clone()), cmd, port, overlay);
                    }
                    ScaleDecision::AtCeiling => {
                        tracing::warn!(fqfn = %fqfn, "maximum instance count reached");
                    }
                    ScaleDecision::NoChange => {}
                    ScaleDecision::ScaleDown => {
                        tracing::warn!(fqfn = %fqfn, "scaling down");
                        watcher.scale_down().await;
                    }
                }

                if let Some(report) = report {
                    for port in report.failed_ports {
                        watcher.terminate_instance(port).await;
                    }
                }
            }
        }
    }

    fn spawn_launch(&self, target: LaunchTarget, cmd: String, port: u16, overlay: Vec<(String, String)>) {
        let launch_tx = self.launch_tx.clone();
        let error_tx = self.error_tx.clone();

        tokio::spawn(async move {
            match launcher::run(&cmd, &overlay) {
                Ok(handle) => {
                    let _ = launch_tx.send(LaunchOutcome { target, port, uuid: handle.uuid, pid: handle.pid });
                }
                Err(source) => {
                    let target = target.to_string();
                    let _ = error_tx.send(EngineError::LaunchFailed { target, source });
                }
            }
        });
    }
}
