// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! The `AppSource` trait: polymorphic over a local `Bundle` and a remote
//! `HttpClient` control-plane poller.

use async_trait::async_trait;
use constd_core::{Application, Runnable};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppSourceError {
    #[error("app source is transiently unavailable: {0}")]
    Unavailable(String),
    #[error("no runnable found for fqfn {0}")]
    RunnableNotFound(String),
    #[error("bundle could not be read: {0}")]
    BundleRead(String),
}

/// A source of Applications and Runnables: either a local Bundle or a
/// polling HTTP client against a remote control plane.
#[async_trait]
pub trait AppSource: Send + Sync {
    /// Initialize the source. The HTTP client variant performs a handshake
    /// here and may fail transiently (retried by the caller per §4.10).
    async fn start(&self) -> Result<(), AppSourceError>;

    /// Snapshot of known Applications. May vary between calls for the HTTP
    /// client variant as the control plane's state changes.
    async fn applications(&self) -> Vec<Application>;

    /// Snapshot of Runnables for one Application.
    async fn runnables(&self, identifier: &str, app_version: &str) -> Vec<Runnable>;

    /// Look up a single Runnable by FQFN, used by a Runner that received an
    /// FQFN as its positional argument.
    async fn find_runnable(&self, fqfn: &str, auth_token: &str) -> Result<Runnable, AppSourceError>;
}
