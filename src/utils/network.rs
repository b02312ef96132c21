//! Network utilities
//!
//! Discovers the local addresses the server can be reached on.

use log::{info, warn};
use std::net::{IpAddr, SocketAddr};

/// A non-loopback interface address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub name: String,
    pub ip: IpAddr,
}

/// Interface addresses a browser on the local network could use. Loopback
/// and IPv6 link-local (`fe80::/10`) addresses are left out.
pub fn reachable_addresses() -> std::io::Result<Vec<InterfaceAddress>> {
    let interfaces = get_if_addrs::get_if_addrs()?;
    Ok(interfaces
        .into_iter()
        .filter(|iface| !iface.is_loopback())
        .map(|iface| InterfaceAddress {
            ip: iface.ip(),
            name: iface.name,
        })
        .filter(|address| !is_ipv6_link_local(&address.ip))
        .collect())
}

pub fn is_ipv6_link_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V6(v6) => (v6.segments()[0] & 0xffc0) == 0xfe80,
        IpAddr::V4(_) => false,
    }
}

/// `http://` URL for an address; IPv6 hosts are bracketed.
pub fn link_for(ip: IpAddr, port: u16) -> String {
    format!("http://{}", SocketAddr::new(ip, port))
}

/// Log one link per reachable address
pub fn log_reachable_addresses(port: u16) {
    match reachable_addresses() {
        Ok(addresses) if addresses.is_empty() => {
            info!("No external interfaces found; use http://localhost:{}", port)
        }
        Ok(addresses) => {
            for address in addresses {
                info!("{} | Link: {}", address.name, link_for(address.ip, port));
            }
        }
        Err(e) => warn!("Failed to enumerate network interfaces: {}", e),
    }
}
