//! # Port Scanner
//!
//! TCP connect scan of one host. Every port of the range becomes one queue
//! item; a [`WorkerPool`] of `min(concurrency, ports)` workers drains it, so
//! no more than `concurrency` sockets are ever open at once.
//!
//! A port is open when the handshake completes within the connect timeout.
//! Refused, filtered and timed-out ports all count as not open.

use std::collections::BTreeSet;
use std::net::SocketAddrV4;
use std::sync::Arc;
use std::time::Duration;

use seekr_common::analysis::PortScanReport;
use seekr_common::config::{self, Config, MAX_SCAN_CONCURRENCY};
use seekr_common::error::{ScanDegraded, ScanError};
use seekr_common::event::{EventSink, ScanEvent};
use seekr_common::network::target::ScanTarget;
use seekr_common::{success, warn};
use tracing::debug;

use crate::network::tcp::{ConnectOutcome, Connector};
use crate::pool::WorkerPool;

pub struct PortScanner {
    connector: Arc<dyn Connector>,
    sink: Arc<dyn EventSink>,
    concurrency: usize,
    connect_timeout: Duration,
}

impl PortScanner {
    /// Fails with a configuration error for a zero-sized pool or a zero
    /// timeout. Nothing is opened until [`PortScanner::scan`].
    pub fn new(
        connector: Arc<dyn Connector>,
        sink: Arc<dyn EventSink>,
        concurrency: usize,
        connect_timeout: Duration,
    ) -> Result<Self, ScanError> {
        config::check_pool("scan_concurrency", concurrency, MAX_SCAN_CONCURRENCY)?;
        config::check_timeout("connect_timeout", connect_timeout)?;
        Ok(Self {
            connector,
            sink,
            concurrency,
            connect_timeout,
        })
    }

    pub fn from_config(
        config: &Config,
        connector: Arc<dyn Connector>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, ScanError> {
        Self::new(connector, sink, config.scan_concurrency, config.connect_timeout)
    }

    pub async fn scan(&self, target: ScanTarget) -> Result<PortScanReport, ScanError> {
        let ip = target.ip;
        let ports: Vec<u16> = target.ports.iter().collect();
        let total = ports.len();

        self.sink.emit(ScanEvent::PortScanStarted { ip, total });
        debug!("Scanning {target} with {} workers", self.concurrency.min(total));

        let connector = Arc::clone(&self.connector);
        let connect_timeout = self.connect_timeout;
        let work = move |port: u16| {
            let connector = Arc::clone(&connector);
            async move {
                let outcome = connector
                    .connect(SocketAddrV4::new(ip, port), connect_timeout)
                    .await;
                (port, outcome)
            }
        };

        let mut open_ports: BTreeSet<u16> = BTreeSet::new();
        let mut completed = 0usize;
        let mut exhausted = 0usize;
        let mut last_cause: Option<String> = None;

        WorkerPool::new("connect", self.concurrency)
            .run(ports, work, |(port, outcome)| {
                completed += 1;
                match outcome {
                    ConnectOutcome::Open => {
                        open_ports.insert(port);
                    }
                    ConnectOutcome::NotOpen => {}
                    ConnectOutcome::Exhausted(e) => {
                        exhausted += 1;
                        last_cause = Some(e.to_string());
                    }
                }
                self.sink.emit(ScanEvent::PortScanProgress { ip, completed, total });
            })
            .await?;

        let mut report = PortScanReport::new(ip, open_ports);
        if exhausted > 0 {
            let degraded = ScanDegraded {
                failed_attempts: exhausted,
                cause: last_cause.unwrap_or_default(),
            };
            warn!("{ip}: {degraded}");
            report.degraded = Some(degraded);
        }

        success!("{ip}: {} open port(s) out of {total}", report.open_ports.len());
        self.sink.emit(ScanEvent::PortScanFinished {
            ip,
            open: report.open_ports.len(),
        });
        Ok(report)
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
