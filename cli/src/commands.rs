pub mod discover;
pub mod info;
pub mod scan;
pub mod sweep;

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use seekr_common::config::Config;
use seekr_common::event::EventSink;
use seekr_common::network::target::PortRange;
use seekr_core::coordinator::ScanCoordinator;

use crate::terminal::progress::TerminalSink;

#[derive(Parser)]
#[command(name = "seekr")]
#[command(about = "Local network reconnaissance: discover hosts, scan ports, identify services.")]
#[command(version)]
pub struct CommandLine {
    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the local network identity
    #[command(alias = "i")]
    Info {
        #[arg(short, long, default_value_t = 24)]
        prefix: u8,
    },
    /// Discover hosts on the local network with ARP
    #[command(alias = "d")]
    Discover(DiscoveryArgs),
    /// Scan and analyse one host
    #[command(alias = "s")]
    Scan {
        target: Ipv4Addr,
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Discover hosts, then scan and analyse each of them
    Sweep {
        #[command(flatten)]
        discovery: DiscoveryArgs,
        #[command(flatten)]
        scan: ScanArgs,
    },
}

#[derive(Args, Clone)]
pub struct DiscoveryArgs {
    /// Block to sweep in CIDR notation instead of the local one
    #[arg(short, long)]
    pub range: Option<String>,

    /// Prefix length of the local block
    #[arg(short, long, default_value_t = 24)]
    pub prefix: u8,

    /// Milliseconds to wait for ARP replies
    #[arg(long = "discovery-timeout", default_value_t = 3000)]
    pub timeout_ms: u64,
}

#[derive(Args, Clone)]
pub struct ScanArgs {
    /// Port or inclusive port range, e.g. 22 or 1-1000
    #[arg(short = 'P', long, default_value = "1-1000")]
    pub ports: PortRange,

    /// Concurrent TCP connect attempts
    #[arg(short, long, default_value_t = 100)]
    pub workers: usize,

    /// Milliseconds before a connect attempt counts as closed
    #[arg(long = "connect-timeout", default_value_t = 500)]
    pub connect_timeout_ms: u64,

    /// Only list open ports
    #[arg(long)]
    pub no_analysis: bool,

    /// Concurrent TLS/HTTP probes
    #[arg(long, default_value_t = 10)]
    pub probe_workers: usize,

    /// Milliseconds before a TLS or HTTP probe gives up
    #[arg(long = "probe-timeout", default_value_t = 3000)]
    pub probe_timeout_ms: u64,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// A coordinator on the real network stack that reports through progress bars.
pub fn coordinator(config: Config) -> anyhow::Result<ScanCoordinator> {
    let sink: Arc<dyn EventSink> = Arc::new(TerminalSink::new());
    ScanCoordinator::new(config, sink).context("invalid settings")
}

impl DiscoveryArgs {
    pub fn apply(&self, config: &mut Config) {
        config.prefix_len = self.prefix;
        config.discovery_timeout = Duration::from_millis(self.timeout_ms);
    }
}

impl ScanArgs {
    pub fn apply(&self, config: &mut Config) {
        config.port_range = self.ports;
        config.scan_concurrency = self.workers;
        config.connect_timeout = Duration::from_millis(self.connect_timeout_ms);
        config.analysis_concurrency = self.probe_workers;
        config.probe_timeout = Duration::from_millis(self.probe_timeout_ms);
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
