//! # Network Identity
//!
//! Works out where this machine sits on the network: the IPv4 address the
//! OS would use for outbound traffic, the interface holding that address,
//! and the block of addresses around it.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

use crate::error::ScanError;
use crate::network::range::{self, CidrRange};

/// Well-known external endpoint used only to make the OS pick a route.
/// Connecting a UDP socket sends nothing on the wire.
const ROUTE_PROBE_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80);

/// Where this machine sits on the network, computed once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkContext {
    pub local_ip: Ipv4Addr,
    pub interface_name: Option<String>,
    pub cidr_range: CidrRange,
}

impl fmt::Display for NetworkContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interface = self.interface_name.as_deref().unwrap_or("unknown interface");
        write!(f, "{} on {} ({})", self.local_ip, interface, self.cidr_range)
    }
}

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
    fn has_ipv4(&self, ip: Ipv4Addr) -> bool;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| {
                if let IpNetwork::V4(ipv4) = ip {
                    Some(*ipv4)
                } else {
                    None
                }
            })
            .collect()
    }

    fn has_ipv4(&self, ip: Ipv4Addr) -> bool {
        self.get_ipv4_nets().iter().any(|net| net.ip() == ip)
    }
}

/// Resolves the local IPv4 address, its interface and the surrounding block.
pub fn resolve_local_identity(prefix: u8) -> Result<NetworkContext, ScanError> {
    let local_ip = local_ipv4()?;
    let interface_name = interface_for(local_ip);
    let cidr_range = range::subnet_for(local_ip, prefix)?;

    Ok(NetworkContext {
        local_ip,
        interface_name,
        cidr_range,
    })
}

/// The source address the OS selects for outbound traffic.
pub fn local_ipv4() -> Result<Ipv4Addr, ScanError> {
    let source = resolve_route_source_ip(ROUTE_PROBE_ADDR)?;
    match source {
        IpAddr::V4(ip) if !ip.is_unspecified() => Ok(ip),
        other => Err(ScanError::NoRoute(format!(
            "OS selected unusable source address {other}"
        ))),
    }
}

fn resolve_route_source_ip(target: SocketAddr) -> Result<IpAddr, ScanError> {
    let bind_addr = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(bind_addr)
        .map_err(|e| ScanError::NoRoute(format!("cannot open route probe socket: {e}")))?;

    socket
        .connect(target)
        .map_err(|e| ScanError::NoRoute(format!("no route towards {target}: {e}")))?;

    socket
        .local_addr()
        .map(|addr| addr.ip())
        .map_err(|e| ScanError::NoRoute(format!("cannot read selected source address: {e}")))
}

/// Name of the first interface bound to `ip`, if any.
pub fn interface_for(ip: Ipv4Addr) -> Option<String> {
    let interfaces: Vec<NetworkInterface> = datalink::interfaces();
    find_interface(ip, &interfaces).map(|intf| intf.name.clone())
}

pub fn find_interface(ip: Ipv4Addr, interfaces: &[NetworkInterface]) -> Option<&NetworkInterface> {
    interfaces.iter().find(|intf| intf.has_ipv4(ip))
}

/// Looks an interface up by name in the OS interface table.
pub fn interface_by_name(name: &str) -> Option<NetworkInterface> {
    datalink::interfaces()
        .into_iter()
        .find(|intf| intf.name == name)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
