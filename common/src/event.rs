//! Progress events and the sink they are delivered to.
//!
//! The core never prints. Whoever drives a session injects an [`EventSink`]
//! and renders the events however it likes.

use std::net::Ipv4Addr;

use crate::analysis::PortAnalysis;
use crate::network::device::Device;
use crate::network::interface::NetworkContext;
use crate::network::range::CidrRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    IdentityResolved(NetworkContext),
    SweepStarted { range: CidrRange, targets: usize },
    DeviceFound(Device),
    SweepFinished { devices: usize },
    PortScanStarted { ip: Ipv4Addr, total: usize },
    PortScanProgress { ip: Ipv4Addr, completed: usize, total: usize },
    PortScanFinished { ip: Ipv4Addr, open: usize },
    AnalysisStarted { ip: Ipv4Addr, ports: usize },
    PortAnalyzed { ip: Ipv4Addr, analysis: PortAnalysis },
    AnalysisFinished { ip: Ipv4Addr },
}

/// Receives events from every stage of a session.
///
/// Called from worker tasks, so implementations must be cheap and must not
/// block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ScanEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ScanEvent) {}
}
