// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The embedded control-plane HTTP server, used when `control_plane ==
//! localhost:9090` (the Supervisor acts as its own control plane). Serves
//! the Bundle App Source over HTTP and accepts upstream registrations.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use constd_core::{Application, Runnable};
use parking_lot::Mutex;
use serde::Deserialize;

use crate::bundle::BundleSource;
use crate::source::AppSource;

#[derive(Clone)]
pub struct ControlPlaneState {
    bundle: Arc<BundleSource>,
    upstreams: Arc<Mutex<Vec<String>>>,
}

impl ControlPlaneState {
    pub fn new(bundle: Arc<BundleSource>) -> Self {
        Self { bundle, upstreams: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn registered_upstreams(&self) -> Vec<String> {
        self.upstreams.lock().clone()
    }
}

#[derive(Debug, Deserialize)]
struct RegisterUpstreamRequest {
    #[serde(rename = "upstreamAddress")]
    upstream_address: String,
}

pub fn router(state: ControlPlaneState) -> Router {
    Router::new()
        .route("/api/v1/applications", get(list_applications))
        .route("/api/v1/runnables/:fqfn", get(find_runnable))
        .route("/api/v1/upstream/register", post(register_upstream))
        .with_state(state)
}

async fn list_applications(State(state): State<ControlPlaneState>) -> Json<Vec<Application>> {
    Json(state.bundle.applications().await)
}

async fn find_runnable(
    State(state): State<ControlPlaneState>,
    Path(fqfn): Path<String>,
) -> Result<Json<Runnable>, StatusCode> {
    state.bundle.find_runnable(&fqfn, "").await.map(Json).map_err(|_| StatusCode::NOT_FOUND)
}

async fn register_upstream(
    State(state): State<ControlPlaneState>,
    Json(body): Json<RegisterUpstreamRequest>,
) -> StatusCode {
    state.upstreams.lock().push(body.upstream_address);
    StatusCode::CREATED
}
