// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The remote-control-plane App Source variant. Polls a control plane over
//! HTTP and caches the last-known snapshot between polls: a poll failure
//! returns the cached snapshot, not an error.

use std::sync::Arc;

use async_trait::async_trait;
use constd_core::{retry_with_backoff, Application, Runnable, RetryPolicy};
use parking_lot::RwLock;

use crate::source::{AppSource, AppSourceError};

#[derive(Default, Clone)]
struct Snapshot {
    applications: Vec<Application>,
}

pub struct HttpClientSource {
    base_url: String,
    client: reqwest::Client,
    cache: Arc<RwLock<Snapshot>>,
}

impl HttpClientSource {
    pub fn new(control_plane: impl Into<String>) -> Self {
        let base_url = control_plane.into();
        let base_url = if base_url.starts_with("http://") || base_url.starts_with("https://") {
            base_url
        } else {
            format!("http://{base_url}")
        };

        Self { base_url, client: reqwest::Client::new(), cache: Arc::new(RwLock::new(Snapshot::default())) }
    }

    async fn fetch_applications(&self) -> Result<Vec<Application>, AppSourceError> {
        let url = format!("{}/api/v1/applications", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppSourceError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AppSourceError::Unavailable(format!("status {}", resp.status())));
        }

        resp.json::<Vec<Application>>().await.map_err(|e| AppSourceError::Unavailable(e.to_string()))
    }

    async fn poll_once(&self) -> Result<(), AppSourceError> {
        let applications = self.fetch_applications().await?;
        *self.cache.write() = Snapshot { applications };
        Ok(())
    }
}

#[async_trait]
impl AppSource for HttpClientSource {
    /// Performs the initial handshake, retrying per `RetryPolicy::app_source`
    /// (`N=10, D=1000ms, F=1.4`). Final exhaustion surfaces as a fatal error
    /// to the caller.
    async fn start(&self) -> Result<(), AppSourceError> {
        retry_with_backoff(RetryPolicy::app_source(), || self.poll_once()).await
    }

    async fn applications(&self) -> Vec<Application> {
        // A background poll failure leaves the cache untouched, so callers
        // always see the last-known-good snapshot rather than an error.
        if let Err(e) = self.poll_once().await {
            tracing::warn!(error = %e, "app source poll failed, serving cached snapshot");
        }
        self.cache.read().applications.clone()
    }

    async fn runnables(&self, identifier: &str, app_version: &str) -> Vec<Runnable> {
        self.applications()
            .await
            .into_iter()
            .filter(|a| a.identifier == identifier && a.app_version == app_version)
            .flat_map(|a| a.runnables)
            .collect()
    }

    async fn find_runnable(&self, fqfn: &str, auth_token: &str) -> Result<Runnable, AppSourceError> {
        let url = format!("{}/api/v1/runnables/{fqfn}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(auth_token)
            .send()
            .await
            .map_err(|e| AppSourceError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AppSourceError::RunnableNotFound(fqfn.to_string()));
        }

        resp.json::<Runnable>().await.map_err(|e| AppSourceError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum::Router;
    use constd_core::Fqfn;

    use super::*;

    fn sample_app() -> Application {
        Application {
            identifier: "com.acme".to_string(),
            app_version: "v1".to_string(),
            runnables: vec![Runnable {
                name: "echo".to_string(),
                namespace: "default".to_string(),
                fqfn: Fqfn::new("com.acme", "default", "echo", "v1"),
                version: "v1".to_string(),
                module_bytes: None,
                module_ref: None,
                capabilities: Default::default(),
            }],
        }
    }

    async fn spawn_fake_control_plane(apps: Vec<Application>) -> String {
        let apps = Arc::new(apps);
        let app = Router::new().route(
            "/api/v1/applications",
            get(move || {
                let apps = apps.clone();
                async move { axum::Json((*apps).clone()) }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("127.0.0.1:{}", addr.port())
    }

    #[tokio::test]
    async fn start_succeeds_once_control_plane_is_reachable() {
        let addr = spawn_fake_control_plane(vec![sample_app()]).await;
        let source = HttpClientSource::new(addr);
        source.start().await.unwrap();
        assert_eq!(source.applications().await.len(), 1);
    }

    #[tokio::test]
    async fn poll_failure_serves_cached_snapshot_not_an_error() {
        // No server at all: start() would fail after retries, but a cache
        // pre-seeded by a prior successful poll should still be servable.
        let source = HttpClientSource::new("127.0.0.1:1");
        *source.cache.write() = Snapshot { applications: vec![sample_app()] };

        let apps = source.applications().await;
        assert_eq!(apps.len(), 1);
    }
}
