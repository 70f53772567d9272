use std::time::Duration;

use crate::error::ScanError;
use crate::network::range::{DEFAULT_PREFIX, MAX_PREFIX, MIN_PREFIX};
use crate::network::target::PortRange;

pub const MAX_SCAN_CONCURRENCY: usize = 4096;
pub const MAX_ANALYSIS_CONCURRENCY: usize = 256;

/// Settings for one reconnaissance session.
///
/// Filled in from command-line flags by the binary. Call [`Config::validate`]
/// before handing it to anything that opens sockets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Ports probed by `scan_host` when the caller names none.
    pub port_range: PortRange,
    /// Maximum number of TCP connect attempts in flight at once.
    pub scan_concurrency: usize,
    pub connect_timeout: Duration,
    /// Maximum number of TLS/HTTP probes in flight at once.
    pub analysis_concurrency: usize,
    pub probe_timeout: Duration,
    /// How long an ARP sweep waits for replies after the last request.
    pub discovery_timeout: Duration,
    /// Prefix length of the block swept around the local address.
    pub prefix_len: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port_range: PortRange::default(),
            scan_concurrency: 100,
            connect_timeout: Duration::from_millis(500),
            analysis_concurrency: 10,
            probe_timeout: Duration::from_secs(3),
            discovery_timeout: Duration::from_secs(3),
            prefix_len: DEFAULT_PREFIX,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ScanError> {
        check_pool("scan_concurrency", self.scan_concurrency, MAX_SCAN_CONCURRENCY)?;
        check_pool(
            "analysis_concurrency",
            self.analysis_concurrency,
            MAX_ANALYSIS_CONCURRENCY,
        )?;
        check_timeout("connect_timeout", self.connect_timeout)?;
        check_timeout("probe_timeout", self.probe_timeout)?;
        check_timeout("discovery_timeout", self.discovery_timeout)?;

        if !(MIN_PREFIX..=MAX_PREFIX).contains(&self.prefix_len) {
            return Err(ScanError::configuration(format!(
                "prefix_len must be within {MIN_PREFIX}..={MAX_PREFIX}, got {}",
                self.prefix_len
            )));
        }
        Ok(())
    }
}

pub fn check_pool(field: &str, value: usize, max: usize) -> Result<(), ScanError> {
    if value == 0 || value > max {
        return Err(ScanError::configuration(format!(
            "{field} must be within 1..={max}, got {value}"
        )));
    }
    Ok(())
}

pub fn check_timeout(field: &str, value: Duration) -> Result<(), ScanError> {
    if value.is_zero() {
        return Err(ScanError::configuration(format!("{field} must be non-zero")));
    }
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
