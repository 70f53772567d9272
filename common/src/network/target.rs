//! # Scan Target Model
//!
//! A port scan is aimed at one IPv4 host and an inclusive port range:
//! * `"80"` names a single port.
//! * `"1-1000"` names an inclusive range.
//!
//! Both bounds must lie in `1..=65535` and the range may not be inverted.

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    low: u16,
    high: u16,
}

impl PortRange {
    pub fn new(low: u16, high: u16) -> Result<Self, ScanError> {
        if low == 0 {
            return Err(ScanError::configuration("port 0 cannot be scanned"));
        }
        if low > high {
            return Err(ScanError::configuration(format!(
                "inverted port range {low}-{high}"
            )));
        }
        Ok(Self { low, high })
    }

    pub fn single(port: u16) -> Result<Self, ScanError> {
        Self::new(port, port)
    }

    pub fn low(&self) -> u16 {
        self.low
    }

    pub fn high(&self) -> u16 {
        self.high
    }

    pub fn contains(&self, port: u16) -> bool {
        self.as_range().contains(&port)
    }

    pub fn len(&self) -> usize {
        usize::from(self.high - self.low) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> RangeInclusive<u16> {
        self.as_range()
    }

    fn as_range(&self) -> RangeInclusive<u16> {
        self.low..=self.high
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self { low: 1, high: 1000 }
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.low == self.high {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}

impl FromStr for PortRange {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('-') {
            Some((low, high)) => Self::new(parse_port(low)?, parse_port(high)?),
            None => Self::single(parse_port(s)?),
        }
    }
}

fn parse_port(s: &str) -> Result<u16, ScanError> {
    s.trim()
        .parse::<u16>()
        .map_err(|e| ScanError::configuration(format!("invalid port '{s}': {e}")))
}

/// One host and the ports to probe on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTarget {
    pub ip: Ipv4Addr,
    pub ports: PortRange,
}

impl ScanTarget {
    pub fn new(ip: Ipv4Addr, ports: PortRange) -> Self {
        Self { ip, ports }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.ip, self.ports)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
