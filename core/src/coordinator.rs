//! # Scan Coordinator
//!
//! Drives one reconnaissance session through its stages:
//!
//! ```text
//! Idle -> Identified -> Discovered -> { HostScanned | HostAnalyzed }* -> Idle
//! ```
//!
//! Every stage after identification needs the [`NetworkContext`], so calling
//! one out of order fails with [`ScanError::InvalidState`]. Nothing runs
//! between calls and nothing is persisted.

use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use seekr_common::analysis::{HostReport, PortAnalysis, PortScanReport};
use seekr_common::config::Config;
use seekr_common::error::ScanError;
use seekr_common::event::{EventSink, ScanEvent};
use seekr_common::info;
use seekr_common::network::device::Device;
use seekr_common::network::interface::NetworkContext;
use seekr_common::network::range::CidrRange;
use seekr_common::network::target::{PortRange, ScanTarget};
use seekr_common::system::SystemRepository;

use crate::analyzer::PortAnalyzer;
use crate::discovery::DeviceDiscoverer;
use crate::network::NetworkProber;
use crate::network::ServiceProber;
use crate::network::channel::{LinkLayer, RawLink};
use crate::network::tcp::{Connector, TcpConnector};
use crate::scanner::PortScanner;
use crate::system::SystemRepo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Identified,
    Discovered,
    HostScanned(Ipv4Addr),
    HostAnalyzed(Ipv4Addr),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Identified => write!(f, "identified"),
            Self::Discovered => write!(f, "discovered"),
            Self::HostScanned(ip) => write!(f, "scanned {ip}"),
            Self::HostAnalyzed(ip) => write!(f, "analyzed {ip}"),
        }
    }
}

/// Clears the single-flight flag when the sweep that set it ends, even if
/// the caller stopped waiting for it.
struct SweepGuard(Arc<AtomicBool>);

impl Drop for SweepGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ScanCoordinator {
    config: Config,
    sink: Arc<dyn EventSink>,
    system: Arc<dyn SystemRepository>,
    link: Arc<dyn LinkLayer>,
    scanner: PortScanner,
    analyzer: PortAnalyzer,
    state: SessionState,
    context: Option<NetworkContext>,
    devices: Vec<Device>,
    sweep_in_flight: Arc<AtomicBool>,
}

impl ScanCoordinator {
    /// A coordinator wired to the real network stack.
    pub fn new(config: Config, sink: Arc<dyn EventSink>) -> Result<Self, ScanError> {
        Self::with_components(
            config,
            sink,
            Arc::new(SystemRepo),
            Arc::new(RawLink),
            Arc::new(TcpConnector),
            Arc::new(NetworkProber),
        )
    }

    pub fn with_components(
        config: Config,
        sink: Arc<dyn EventSink>,
        system: Arc<dyn SystemRepository>,
        link: Arc<dyn LinkLayer>,
        connector: Arc<dyn Connector>,
        prober: Arc<dyn ServiceProber>,
    ) -> Result<Self, ScanError> {
        config.validate()?;
        let scanner = PortScanner::from_config(&config, connector, Arc::clone(&sink))?;
        let analyzer = PortAnalyzer::from_config(&config, prober, Arc::clone(&sink))?;

        Ok(Self {
            config,
            sink,
            system,
            link,
            scanner,
            analyzer,
            state: SessionState::Idle,
            context: None,
            devices: Vec::new(),
            sweep_in_flight: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn context(&self) -> Option<&NetworkContext> {
        self.context.as_ref()
    }

    /// Devices from the latest sweep, sorted by address.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Resolves the local network identity. Allowed from any state; a new
    /// identity drops the devices of the previous one.
    pub fn identify(&mut self) -> Result<NetworkContext, ScanError> {
        let context = self.system.resolve_identity(self.config.prefix_len)?;
        info!("Local identity: {context}");

        self.sink.emit(ScanEvent::IdentityResolved(context.clone()));
        self.context = Some(context.clone());
        self.devices.clear();
        self.state = SessionState::Identified;
        Ok(context)
    }

    /// Sweeps the identified block and replaces the device list.
    pub async fn discover(&mut self) -> Result<Vec<Device>, ScanError> {
        let range = self.require_context("discover")?.cidr_range;
        self.sweep(range).await
    }

    /// Sweeps a caller-chosen block, given in CIDR notation.
    pub async fn discover_range(&mut self, cidr: &str) -> Result<Vec<Device>, ScanError> {
        self.require_context("discover")?;
        let range: CidrRange = cidr.parse()?;
        self.sweep(range).await
    }

    pub async fn rescan(&mut self) -> Result<Vec<Device>, ScanError> {
        self.discover().await
    }

    /// Connect-scans one host. Without `ports` the configured range is used.
    pub async fn scan_host(&mut self, ip: Ipv4Addr, ports: Option<PortRange>) -> Result<PortScanReport, ScanError> {
        self.require_context("scan_host")?;
        let target = ScanTarget::new(ip, ports.unwrap_or(self.config.port_range));

        let report = self.scanner.scan(target).await?;
        self.state = SessionState::HostScanned(ip);
        Ok(report)
    }

    pub async fn analyze_host(&mut self, ip: Ipv4Addr, ports: &BTreeSet<u16>) -> Result<Vec<PortAnalysis>, ScanError> {
        self.require_context("analyze_host")?;

        let analyses = self.analyzer.analyze(ip, ports).await?;
        self.state = SessionState::HostAnalyzed(ip);
        Ok(analyses)
    }

    /// Scans the configured range of one host, then analyses its open ports.
    pub async fn inspect_host(&mut self, ip: Ipv4Addr) -> Result<HostReport, ScanError> {
        let scan = self.scan_host(ip, None).await?;
        let analyses = self.analyze_host(ip, &scan.open_ports).await?;
        Ok(HostReport { ip, scan, analyses })
    }

    /// Inspects every device of the latest sweep, one after another.
    pub async fn inspect_all(&mut self) -> Result<Vec<HostReport>, ScanError> {
        self.require_context("inspect_all")?;

        let targets: Vec<Ipv4Addr> = self.devices.iter().map(|d| d.ip).collect();
        let mut reports = Vec::with_capacity(targets.len());
        for ip in targets {
            reports.push(self.inspect_host(ip).await?);
        }
        Ok(reports)
    }

    /// Back to [`SessionState::Idle`], forgetting the identity and devices.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.context = None;
        self.devices.clear();
    }

    fn require_context(&self, operation: &'static str) -> Result<&NetworkContext, ScanError> {
        match (&self.state, &self.context) {
            (SessionState::Idle, _) | (_, None) => Err(ScanError::InvalidState {
                operation,
                state: self.state.to_string(),
            }),
            (_, Some(context)) => Ok(context),
        }
    }

    async fn sweep(&mut self, range: CidrRange) -> Result<Vec<Device>, ScanError> {
        let context = self.require_context("discover")?;
        let name = context.interface_name.clone().ok_or_else(|| ScanError::Interface {
            name: context.local_ip.to_string(),
            reason: "no interface holds the local address".to_string(),
        })?;
        let intf = self.system.interface_by_name(&name).ok_or_else(|| ScanError::Interface {
            name: name.clone(),
            reason: "interface is no longer present".to_string(),
        })?;

        if self.sweep_in_flight.swap(true, Ordering::AcqRel) {
            return Err(ScanError::DiscoveryInProgress);
        }
        let guard = SweepGuard(Arc::clone(&self.sweep_in_flight));

        let discoverer = DeviceDiscoverer::new(Arc::clone(&self.link), Arc::clone(&self.sink));
        let timeout = self.config.discovery_timeout;
        let devices = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            discoverer.discover(&intf, &range, timeout)
        })
        .await
        .map_err(|e| ScanError::Worker(format!("discovery task failed: {e}")))??;

        self.devices = devices.clone();
        self.state = SessionState::Discovered;
        Ok(devices)
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
