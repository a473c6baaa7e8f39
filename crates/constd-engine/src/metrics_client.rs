// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The Metrics Client: fetches `SchedulerMetrics` from a Runner's
//! `/meta/metrics` endpoint with a hard 1-second timeout.

use std::time::Duration;

use constd_wire::{MetricsResponse, SchedulerMetrics};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("metrics request failed: {0}")]
    Request(String),
    #[error("metrics endpoint returned non-success status {0}")]
    Status(u16),
    #[error("metrics response body was malformed: {0}")]
    Malformed(String),
}

/// A thin `reqwest`-backed client for the `GET /meta/metrics` endpoint.
///
/// The 1-second timeout is set on the client itself (not wrapped in a
/// `tokio::time::timeout`), mirroring `http.Client{Timeout: time.Second}` in
/// the original implementation while still bounding a hung connect.
#[derive(Clone)]
pub struct MetricsClient {
    client: reqwest::Client,
}

impl MetricsClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// Fetch metrics for the Runner listening on `port`. A non-200 status,
    /// a timeout, and a malformed body are all treated identically by the
    /// caller: the port goes on the tick's `failed_ports` list.
    pub async fn report(&self, port: u16) -> Result<SchedulerMetrics, MetricsError> {
        let url = format!("http://localhost:{port}/meta/metrics");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MetricsError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MetricsError::Status(resp.status().as_u16()));
        }

        let body: MetricsResponse =
            resp.json().await.map_err(|e| MetricsError::Malformed(e.to_string()))?;
        Ok(body.scheduler)
    }
}

impl Default for MetricsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum::Router;

    use super::*;

    async fn spawn_metrics_server(body: &'static str, status: axum::http::StatusCode) -> u16 {
        let app = Router::new().route(
            "/meta/metrics",
            get(move || async move { (status, body) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        port
    }

    #[tokio::test]
    async fn report_parses_a_successful_response() {
        let port = spawn_metrics_server(
            r#"{"scheduler":{"total_thread_count":4}}"#,
            axum::http::StatusCode::OK,
        )
        .await;

        let client = MetricsClient::new();
        let metrics = client.report(port).await.unwrap();
        assert_eq!(metrics.total_thread_count, 4);
    }

    #[tokio::test]
    async fn report_fails_on_non_200_status() {
        let port =
            spawn_metrics_server(r#"{}"#, axum::http::StatusCode::INTERNAL_SERVER_ERROR).await;

        let client = MetricsClient::new();
        let err = client.report(port).await.unwrap_err();
        assert!(matches!(err, MetricsError::Status(500)));
    }

    #[tokio::test]
    async fn report_fails_on_malformed_body() {
        let port = spawn_metrics_server("not json", axum::http::StatusCode::OK).await;

        let client = MetricsClient::new();
        let err = client.report(port).await.unwrap_err();
        assert!(matches!(err, MetricsError::Malformed(_)));
    }

    #[tokio::test]
    async fn report_fails_when_nothing_is_listening() {
        let client = MetricsClient::new();
        // Port 1 is privileged and essentially never has a listener in test
        // environments, which is what we want for a connection-refused case.
        let err = client.report(1).await.unwrap_err();
        assert!(matches!(err, MetricsError::Request(_)));
    }
}
