// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The Runner's function-invocation HTTP handler (`spec.md` §4.8 step 3,
//! §7). Grounded in `original_source/sat/handler.go`: builds a
//! `CoordinatedRequest` from the incoming HTTP request, executes it against
//! the `ModuleRuntime`, and maps the result back onto the HTTP response —
//! `RunErr` becomes its own status/body, an opaque exec error becomes a
//! generic 500.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use constd_wire::CoordinatedRequest;
use uuid::Uuid;

use crate::metrics::ActiveExecutions;
use crate::runtime::{ModuleRunError, ModuleRuntime};

#[derive(Clone)]
pub struct HandlerState {
    pub runtime: Arc<dyn ModuleRuntime>,
    pub active: Arc<ActiveExecutions>,
}

fn headers_to_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
        .collect()
}

pub fn build_request(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> CoordinatedRequest {
    CoordinatedRequest {
        method: method.to_string(),
        url: uri.to_string(),
        id: Uuid::new_v4().to_string(),
        body: body.to_vec(),
        headers: headers_to_map(&headers),
        resp_headers: HashMap::new(),
        params: HashMap::new(),
        state: HashMap::new(),
        sequence_json: String::new(),
    }
}

/// `ANY /*` (`spec.md` §6): invokes the loaded Runnable.
pub async fn invoke(
    State(state): State<HandlerState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let req = build_request(method, uri, headers, body);
    let id = req.id.clone();
    let _guard = state.active.track();

    match state.runtime.execute(req).await {
        Ok(resp) => {
            let mut response_headers = HeaderMap::new();
            for (k, v) in &resp.resp_headers {
                if let (Ok(name), Ok(value)) = (
                    axum::http::HeaderName::try_from(k.as_str()),
                    axum::http::HeaderValue::try_from(v.as_str()),
                ) {
                    response_headers.insert(name, value);
                }
            }
            (response_headers, resp.output).into_response()
        }
        Err(ModuleRunError::Run(run_err)) => {
            tracing::debug!(id, code = run_err.code, message = %run_err.message, "runnable returned an error");
            let status = StatusCode::from_u16(run_err.code as u16).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, run_err.message).into_response()
        }
        Err(ModuleRunError::Exec(err)) => {
            tracing::error!(id, error = %err, "runnable execution failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "unknown error").into_response()
        }
    }
}
