// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Supervisor registration against a remote control plane (§4.11). Used
//! only when `control_plane != localhost:9090`: the Supervisor is not its
//! own control plane, so it must announce itself as an upstream.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("no non-loopback private IPv4 address found and no upstream_host configured")]
    NoAddressAvailable,
    #[error("registration request failed: {0}")]
    RequestFailed(String),
    #[error("control plane rejected registration with status {0}")]
    Rejected(u16),
}

/// Enumerates non-loopback, private IPv4 interface addresses. Used to pick
/// the addresses the Supervisor announces to the control plane when
/// `upstream_host` is not explicitly configured.
pub fn private_ipv4_addresses() -> Vec<std::net::Ipv4Addr> {
    if_addrs::get_if_addrs()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|iface| match iface.addr.ip() {
            std::net::IpAddr::V4(v4) if !v4.is_loopback() && is_private_v4(v4) => Some(v4),
            _ => None,
        })
        .collect()
}

fn is_private_v4(addr: std::net::Ipv4Addr) -> bool {
    let octets = addr.octets();
    matches!(octets, [10, ..] | [172, 16..=31, ..] | [192, 168, ..])
}

/// Resolves the set of `host:port` upstream addresses this Supervisor should
/// announce: `upstream_host` alone if configured, otherwise every
/// non-loopback private IPv4 address found on the host.
pub fn resolve_upstream_addresses(upstream_host: Option<&str>, atmo_port: u16) -> Vec<String> {
    if let Some(host) = upstream_host {
        return vec![format!("{host}:{atmo_port}")];
    }

    private_ipv4_addresses().into_iter().map(|addr| format!("{addr}:{atmo_port}")).collect()
}

fn base_url(control_plane: &str) -> String {
    if control_plane.starts_with("http://") || control_plane.starts_with("https://") {
        control_plane.to_string()
    } else {
        format!("http://{control_plane}")
    }
}

async fn register_one(
    client: &reqwest::Client,
    control_plane: &str,
    upstream_address: &str,
) -> Result<(), RegistrationError> {
    let url = format!("{}/api/v1/upstream/register", base_url(control_plane));

    let resp = client
        .post(&url)
        .json(&serde_json::json!({ "upstreamAddress": upstream_address }))
        .send()
        .await
        .map_err(|e| RegistrationError::RequestFailed(e.to_string()))?;

    if resp.status().as_u16() != 201 {
        return Err(RegistrationError::Rejected(resp.status().as_u16()));
    }

    Ok(())
}

/// Registers every address in `upstreams` as an upstream with a remote
/// control plane. An empty list is a no-op returning success. Any non-201
/// response (or transport failure) for any address is treated as fatal by
/// the caller, per §4.11 and testable property 8.
pub async fn register_upstreams(
    client: &reqwest::Client,
    control_plane: &str,
    upstreams: &[String],
) -> Result<(), RegistrationError> {
    for upstream in upstreams {
        register_one(client, control_plane, upstream).await?;
    }
    Ok(())
}

/// Convenience wrapper combining address resolution and registration, as
/// used by the Supervisor's startup path.
pub async fn register(
    client: &reqwest::Client,
    control_plane: &str,
    upstream_host: Option<&str>,
    atmo_port: u16,
) -> Result<(), RegistrationError> {
    let upstreams = resolve_upstream_addresses(upstream_host, atmo_port);
    if upstreams.is_empty() {
        return Err(RegistrationError::NoAddressAvailable);
    }
    register_upstreams(client, control_plane, &upstreams).await
}
