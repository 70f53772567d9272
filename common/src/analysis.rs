//! # Scan and analysis results
//!
//! Plain values handed back to callers. Failures of individual probes are
//! folded in as `Err` values so one unreachable service never hides the rest
//! of a host's report.

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use crate::error::{HttpError, ScanDegraded, TlsError};

/// Rendering used for a header the server did not send.
pub const UNKNOWN_HEADER: &str = "Unknown";

/// Metadata read from the leaf certificate of a TLS handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsInfo {
    /// Issuer attributes keyed by short name, e.g. `commonName`.
    pub issuer: BTreeMap<String, String>,
    pub subject: BTreeMap<String, String>,
    /// Negotiated protocol, e.g. `TLSv1.3`.
    pub protocol_version: String,
    /// Upper-case hex without separators.
    pub serial_number: String,
}

impl TlsInfo {
    pub fn subject_common_name(&self) -> Option<&str> {
        self.subject.get("commonName").map(String::as_str)
    }

    pub fn issuer_common_name(&self) -> Option<&str> {
        self.issuer.get("commonName").map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpInfo {
    pub status_code: u16,
    pub server_header: Option<String>,
    pub content_type: Option<String>,
}

impl HttpInfo {
    pub fn server(&self) -> &str {
        self.server_header.as_deref().unwrap_or(UNKNOWN_HEADER)
    }

    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(UNKNOWN_HEADER)
    }
}

/// Classification of one open port plus whatever its probes returned.
///
/// `tls` is only set for TLS-bearing services and `http` only for
/// HTTP-bearing ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortAnalysis {
    pub port: u16,
    pub service: &'static str,
    pub tls: Option<Result<TlsInfo, TlsError>>,
    pub http: Option<Result<HttpInfo, HttpError>>,
}

impl PortAnalysis {
    pub fn new(port: u16, service: &'static str) -> Self {
        Self {
            port,
            service,
            tls: None,
            http: None,
        }
    }
}

/// Open ports of one host from a single connect-scan pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortScanReport {
    pub ip: Ipv4Addr,
    pub open_ports: BTreeSet<u16>,
    /// Set when some attempts hit OS resource limits and were counted as
    /// not open.
    pub degraded: Option<ScanDegraded>,
}

impl PortScanReport {
    pub fn new(ip: Ipv4Addr, open_ports: BTreeSet<u16>) -> Self {
        Self {
            ip,
            open_ports,
            degraded: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Full pipeline result for one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostReport {
    pub ip: Ipv4Addr,
    pub scan: PortScanReport,
    pub analyses: Vec<PortAnalysis>,
}

impl HostReport {
    pub fn analysis_for(&self, port: u16) -> Option<&PortAnalysis> {
        self.analyses.iter().find(|a| a.port == port)
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
