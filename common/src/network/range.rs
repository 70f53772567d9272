use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::ScanError;

/// Smallest prefix accepted for a sweep. Anything wider means tens of
/// thousands of ARP frames per pass.
pub const MIN_PREFIX: u8 = 16;
pub const MAX_PREFIX: u8 = 32;
pub const DEFAULT_PREFIX: u8 = 24;

/// An IPv4 network block, normalised to its network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CidrRange {
    network: Ipv4Network,
}

impl CidrRange {
    pub fn new(ip: Ipv4Addr, prefix: u8) -> Result<Self, ScanError> {
        if !(MIN_PREFIX..=MAX_PREFIX).contains(&prefix) {
            return Err(ScanError::configuration(format!(
                "prefix /{prefix} is outside /{MIN_PREFIX}../{MAX_PREFIX}"
            )));
        }
        let network = Ipv4Network::new(ip, prefix)
            .and_then(|net| Ipv4Network::new(net.network(), prefix))
            .map_err(|e| ScanError::InvalidAddress(format!("{ip}/{prefix}: {e}")))?;
        Ok(Self { network })
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network.network()
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        self.network.broadcast()
    }

    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.network.contains(ip)
    }

    /// Addresses a host can hold. Network and broadcast addresses are left
    /// out unless the block is a /31 or /32, which have none to spare.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        let strip = self.prefix() <= 30;
        let (network, broadcast) = (self.network(), self.broadcast());
        self.network
            .iter()
            .filter(move |ip| !strip || (*ip != network && *ip != broadcast))
    }

    pub fn host_count(&self) -> usize {
        self.hosts().count()
    }
}

impl fmt::Display for CidrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix())
    }
}

impl FromStr for CidrRange {
    type Err = ScanError;

    /// Parses CIDR notation like "192.168.1.0/24". Host bits are allowed and
    /// dropped, so "192.168.1.77/24" names the same block.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((ip_str, prefix_str)) = s.split_once('/') else {
            return Err(ScanError::configuration(format!(
                "'{s}' is not in address/prefix notation"
            )));
        };

        let ip = ip_str
            .parse::<Ipv4Addr>()
            .map_err(|e| ScanError::configuration(format!("invalid IP in CIDR '{ip_str}': {e}")))?;

        let prefix = prefix_str.parse::<u8>().map_err(|e| {
            ScanError::configuration(format!("invalid prefix in CIDR '{prefix_str}': {e}"))
        })?;

        Self::new(ip, prefix)
    }
}

/// Computes the block of the given prefix length that contains `ip`.
pub fn subnet_for(ip: Ipv4Addr, prefix: u8) -> Result<CidrRange, ScanError> {
    CidrRange::new(ip, prefix)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
