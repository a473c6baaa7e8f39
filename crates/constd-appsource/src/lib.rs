// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! App Source: the abstraction over "where do Applications and Runnables
//! come from", plus its Bundle (local) and HTTP client (remote) variants
//! and the embedded control plane / upstream registration surfaces that sit
//! alongside them.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod bundle;
pub mod control_plane;
pub mod http_client;
pub mod registration;
pub mod source;

pub use bundle::BundleSource;
pub use control_plane::{router, ControlPlaneState};
pub use http_client::HttpClientSource;
pub use registration::{
    private_ipv4_addresses, register, register_upstreams, resolve_upstream_addresses,
    RegistrationError,
};
pub use source::{AppSource, AppSourceError};
