//! Host identity resolution.
//!
//! The exporter labels every sample with a single LAN address, resolved once
//! at startup:
//! - `host.ip` when configured
//! - otherwise the first local IPv4 candidate matching `host.lan_prefixes`
//!
//! Candidates are the IPv4 addresses of the local interfaces, in interface
//! order. The outbound route (UDP `connect`, no packet is sent) and the
//! machine's hostname are appended as fallbacks for platforms without
//! interface enumeration.

use std::net::{IpAddr, ToSocketAddrs, UdpSocket};

use moni_core::error::{MoniError, Result};

use crate::config::HostSection;

// Any routable address works; only the local side of the socket is read.
const ROUTE_PROBE: &str = "8.8.8.8:80";

pub fn resolve(cfg: &HostSection) -> Result<String> {
    if let Some(ip) = &cfg.ip {
        return Ok(ip.clone());
    }
    let candidates = local_candidates();
    tracing::debug!(?candidates, "host address candidates");
    pick_lan_ip(&candidates, &cfg.lan_prefixes).ok_or_else(|| {
        MoniError::Config(format!(
            "no local IPv4 address matches lan prefixes {:?}",
            cfg.lan_prefixes
        ))
    })
}

/// First IPv4 candidate whose dotted form starts with one of `prefixes`.
pub fn pick_lan_ip(candidates: &[IpAddr], prefixes: &[String]) -> Option<String> {
    candidates
        .iter()
        .filter(|ip| ip.is_ipv4())
        .map(|ip| ip.to_string())
        .find(|ip| matches_lan_prefix(ip, prefixes))
}

pub fn matches_lan_prefix(ip: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| !p.is_empty() && ip.starts_with(p.as_str()))
}

fn local_candidates() -> Vec<IpAddr> {
    let interfaces = interface_addrs().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "interface enumeration failed");
        Vec::new()
    });
    let route = route_local_addr()
        .map_err(|e| tracing::debug!(error = %e, "route probe failed"))
        .ok();
    let named = hostname_addrs().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "hostname lookup failed");
        Vec::new()
    });
    merge_candidates(interfaces, route, named)
}

/// Interface addresses first, then route and hostname fallbacks, deduplicated.
pub fn merge_candidates(interfaces: Vec<IpAddr>, route: Option<IpAddr>, named: Vec<IpAddr>) -> Vec<IpAddr> {
    let mut out: Vec<IpAddr> = Vec::with_capacity(interfaces.len() + named.len() + 1);
    for ip in interfaces.into_iter().chain(route).chain(named) {
        if !out.contains(&ip) {
            out.push(ip);
        }
    }
    out
}

/// IPv4 addresses of all local interfaces.
#[cfg(unix)]
pub fn interface_addrs() -> std::io::Result<Vec<IpAddr>> {
    let addrs = nix::ifaddrs::getifaddrs().map_err(std::io::Error::from)?;
    Ok(addrs
        .filter_map(|ifa| ifa.address)
        .filter_map(|sa| sa.as_sockaddr_in().map(|sin| IpAddr::V4(sin.ip())))
        .collect())
}

#[cfg(not(unix))]
pub fn interface_addrs() -> std::io::Result<Vec<IpAddr>> {
    Ok(Vec::new())
}

fn route_local_addr() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(ROUTE_PROBE)?;
    Ok(socket.local_addr()?.ip())
}

fn hostname_addrs() -> std::io::Result<Vec<IpAddr>> {
    let name = hostname::get()?.to_string_lossy().into_owned();
    Ok((name.as_str(), 0).to_socket_addrs()?.map(|sa| sa.ip()).collect())
}
