/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use log::warn;
use uuid::Uuid;

/// Identity of the running agent, used for tag placeholders.
#[derive(Clone, Debug)]
pub struct HostInfo {
    pub hostname: String,
    pub ip: Option<Ipv4Addr>,
    pub run_id: String,
}

impl HostInfo {
    /// Detect the local identity. A non-empty `hostname` overrides the system one.
    pub fn detect(hostname: &str) -> Self {
        let hostname = if hostname.is_empty() {
            system_hostname()
        } else {
            hostname.to_string()
        };
        HostInfo {
            hostname,
            ip: local_ipv4(),
            run_id: Uuid::new_v4().simple().to_string(),
        }
    }
}

#[cfg(unix)]
fn system_hostname() -> String {
    let uname = rustix::system::uname();
    uname.nodename().to_string_lossy().to_string()
}

#[cfg(not(unix))]
fn system_hostname() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_default()
}

/// The source address the kernel would pick for outgoing traffic.
fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)).ok()?;
    if let Err(e) = socket.connect(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 255, 255, 255)), 1)) {
        warn!("unable to detect local ipv4 address: {e}");
        return None;
    }
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect() {
        let host = HostInfo::detect("node-1");
        assert_eq!(host.hostname, "node-1");
        assert_eq!(host.run_id.len(), 32);
        if let Some(ip) = host.ip {
            assert!(!ip.is_loopback());
        }

        let host = HostInfo::detect("");
        assert_ne!(host.run_id, HostInfo::detect("").run_id);
    }
}
