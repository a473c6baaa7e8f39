// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Assembles the Runner's HTTP router (`spec.md` §6): the mesh WebSocket
//! upgrade, the metrics endpoint, and the catch-all invocation route, in
//! that priority order so the two well-known paths never fall through to
//! invocation.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::Response;
use axum::routing::{any, get};
use axum::{Json, Router};

use crate::handler::{self, HandlerState};
use crate::mesh::{self, MeshState};
use crate::metrics::ActiveExecutions;
use crate::runtime::ModuleRuntime;

#[derive(Clone)]
pub struct AppState {
    pub handler: HandlerState,
    pub mesh: MeshState,
}

impl AppState {
    pub fn new(runtime: Arc<dyn ModuleRuntime>, job_type: impl Into<String>) -> Self {
        let active = Arc::new(ActiveExecutions::new());
        let job_type = job_type.into();
        Self {
            handler: HandlerState { runtime: runtime.clone(), active: active.clone() },
            mesh: MeshState::new(runtime, active, job_type),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/meta/message", get(mesh_upgrade))
        .route("/meta/metrics", get(metrics))
        .fallback(any(invoke))
        .with_state(state)
}

async fn mesh_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| mesh::serve_inbound(socket, state.mesh))
}

async fn metrics(State(state): State<AppState>) -> Json<constd_wire::MetricsResponse> {
    Json(state.handler.active.snapshot())
}

async fn invoke(
    State(state): State<AppState>,
    method: axum::http::Method,
    uri: axum::http::Uri,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    handler::invoke(State(state.handler), method, uri, headers, body).await
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::runtime::LoggingStubRuntime;

    fn app() -> Router {
        router(AppState::new(Arc::new(LoggingStubRuntime), "com.acme#default::echo@v1"))
    }

    #[tokio::test]
    async fn metrics_returns_the_scheduler_envelope() {
        let resp = app()
            .oneshot(Request::builder().uri("/meta/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn the_catch_all_route_invokes_the_runnable() {
        let resp = app()
            .oneshot(Request::builder().method("POST").uri("/anything").body(Body::from("hi")).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
