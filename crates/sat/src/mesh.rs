// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The Runner's peer mesh (`spec.md` §4.8 steps 5-6, §4.9). Grounded in
//! `original_source/sat/sat.go` (Grav wiring), `meshed.go` (step handling),
//! and `peers.go` (static peer connect with retry) — and, for the
//! WebSocket transport plumbing itself, in the teacher's
//! `adapters/agent/coop/ws.rs` / `docker/ws.rs` subscribe loops.
//!
//! `handle_message` is the pure dispatch logic and is fully unit-testable;
//! `serve_inbound`/`connect_static_peers` are the thin transport loops
//! around it, one per accepted or dialed connection.
//!
//! A real multi-node mesh needs an interest directory to route a step to
//! exactly the peer that holds it; that directory is out of scope here, so
//! every step/result message is broadcast to every connected peer and each
//! peer ignores what isn't addressed to its own job type. This is the one
//! simplification against the original's Grav bus, noted in `DESIGN.md`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message as AxumMessage, WebSocket};
use constd_core::{retry_with_backoff, RetryPolicy};
use constd_wire::{CoordinatedRequest, MeshMessage, MSG_TYPE_FN_RESULT};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message as TungsteniteMessage;

use crate::metrics::ActiveExecutions;
use crate::runtime::ModuleRuntime;
use crate::step;

#[derive(Clone)]
pub struct MeshState {
    pub runtime: Arc<dyn ModuleRuntime>,
    pub active: Arc<ActiveExecutions>,
    pub job_type: String,
    bus: broadcast::Sender<MeshMessage>,
    withdrawn: Arc<AtomicBool>,
}

impl MeshState {
    pub fn new(runtime: Arc<dyn ModuleRuntime>, active: Arc<ActiveExecutions>, job_type: impl Into<String>) -> Self {
        let (bus, _rx) = broadcast::channel(256);
        Self { runtime, active, job_type: job_type.into(), bus, withdrawn: Arc::new(AtomicBool::new(false)) }
    }

    /// Stops this node from picking up new step messages. Called on
    /// shutdown before the 3s drain (`spec.md` §4.8 step 8); in-flight
    /// executions still run to completion.
    pub fn withdraw(&self) {
        self.withdrawn.store(true, Ordering::SeqCst);
    }

    pub fn is_withdrawn(&self) -> bool {
        self.withdrawn.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<MeshMessage> {
        self.bus.subscribe()
    }

    fn publish(&self, msg: MeshMessage) {
        // No subscribers (e.g. no peers connected yet) is not an error.
        let _ = self.bus.send(msg);
    }
}

/// Dispatches one inbound mesh message, publishing everything it produces
/// onto the local bus — never back to the caller directly. Every connection
/// (including the one that delivered `msg`) carries its own `bus_rx`
/// subscription in its transport loop, so a published message reaches the
/// originating peer the same way it reaches every other connected peer; a
/// direct return here on top of that would hand the originating peer its
/// own reply twice. If `msg` addresses this node's job type and the node
/// hasn't withdrawn, executes the step and publishes the `atmo.fnresult`
/// reply (fn-result messages are forwarded as-is; step messages not
/// addressed here are forwarded so a peer closer to the right job type can
/// pick them up).
pub async fn handle_message(state: &MeshState, msg: MeshMessage) {
    if msg.is_fn_result() {
        state.publish(msg);
        return;
    }

    if msg.message_type != state.job_type || state.is_withdrawn() {
        state.publish(msg);
        return;
    }

    let req: CoordinatedRequest = match serde_json::from_slice(&msg.data) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(error = %e, "mesh message body did not parse as a coordinated request");
            return;
        }
    };
    let request_id = req.id.clone();

    let _guard = state.active.track();
    let exec_result = state.runtime.execute(req.clone()).await;

    let outcome = match step::handle_fn_result(&state.job_type, req, exec_result) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "failed to handle function-chain step");
            return;
        }
    };

    let fn_result_bytes = match serde_json::to_vec(&outcome.fn_result) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize fn result");
            return;
        }
    };
    let reply = MeshMessage::with_parent_id(MSG_TYPE_FN_RESULT, request_id.clone(), fn_result_bytes);
    state.publish(reply);

    if let Some(next) = outcome.next_message {
        if let Ok(bytes) = serde_json::to_vec(&next.request) {
            state.publish(MeshMessage::with_parent_id(next.fqfn, request_id, bytes));
        }
    }
}

/// `GET /meta/message` (`spec.md` §4.8 step 5): serves one accepted mesh
/// peer connection until it closes.
pub async fn serve_inbound(mut socket: WebSocket, state: MeshState) {
    let mut bus_rx = state.subscribe();

    loop {
        tokio::select! {
            frame = socket.recv() => {
                match frame {
                    Some(Ok(AxumMessage::Text(text))) => {
                        if let Ok(msg) = serde_json::from_str::<MeshMessage>(&text) {
                            handle_message(&state, msg).await;
                        }
                    }
                    Some(Ok(AxumMessage::Binary(bytes))) => {
                        if let Ok(msg) = serde_json::from_slice::<MeshMessage>(&bytes) {
                            handle_message(&state, msg).await;
                        }
                    }
                    Some(Ok(AxumMessage::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "mesh peer connection error");
                        break;
                    }
                    _ => {}
                }
            }
            relayed = bus_rx.recv() => {
                if let Ok(msg) = relayed {
                    if let Ok(json) = serde_json::to_string(&msg) {
                        let _ = socket.send(AxumMessage::Text(json)).await;
                    }
                }
            }
        }
    }
}

/// Dials every `SAT_PEERS` endpoint, retrying each per
/// `RetryPolicy::static_peer` (`spec.md` §4.10: `N=10, D=3000ms, F=1.0`).
/// Grounded in `original_source/sat/peers.go`'s `connectStaticPeers`.
pub async fn connect_static_peers(peers: Vec<String>, state: MeshState) {
    for peer in peers {
        let state = state.clone();
        tokio::spawn(async move {
            let connect = retry_with_backoff(RetryPolicy::static_peer(), || async {
                tokio_tungstenite::connect_async(peer.as_str()).await.map(|(stream, _)| stream)
            })
            .await;

            match connect {
                Ok(stream) => serve_outbound(stream, state).await,
                Err(e) => tracing::error!(peer, error = %e, "failed to connect to static mesh peer, giving up"),
            }
        });
    }
}

async fn serve_outbound<S>(stream: tokio_tungstenite::WebSocketStream<S>, state: MeshState)
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let (mut write, mut read) = stream.split();
    let mut bus_rx = state.subscribe();

    loop {
        tokio::select! {
            frame = read.next() => {
                match frame {
                    Some(Ok(TungsteniteMessage::Text(text))) => {
                        if let Ok(msg) = serde_json::from_str::<MeshMessage>(&text) {
                            handle_message(&state, msg).await;
                        }
                    }
                    Some(Ok(TungsteniteMessage::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "static mesh peer connection error");
                        break;
                    }
                    _ => {}
                }
            }
            relayed = bus_rx.recv() => {
                if let Ok(msg) = relayed {
                    if let Ok(json) = serde_json::to_string(&msg) {
                        let _ = write.send(TungsteniteMessage::Text(json)).await;
                    }
                }
            }
        }
    }
}
