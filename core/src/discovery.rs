//! # Device Discovery
//!
//! Finds live hosts on the local segment with a single ARP sweep: one
//! broadcast request per host address of the range, then one bounded wait
//! for replies. Hosts that ignore ARP (or sit behind a router) are not
//! found. There are no retries.
//!
//! The sweep is blocking I/O on a raw link-layer channel and is meant to be
//! run on a blocking thread.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pnet::datalink::{DataLinkReceiver, DataLinkSender, NetworkInterface};
use pnet::util::MacAddr;
use seekr_common::error::ScanError;
use seekr_common::event::{EventSink, ScanEvent};
use seekr_common::network::device::Device;
use seekr_common::network::interface::NetworkInterfaceExtension;
use seekr_common::network::range::CidrRange;
use seekr_common::{success, warn};
use seekr_protocols::arp;
use tracing::debug;

use crate::network::channel::LinkLayer;

pub struct DeviceDiscoverer {
    link: Arc<dyn LinkLayer>,
    sink: Arc<dyn EventSink>,
}

impl DeviceDiscoverer {
    pub fn new(link: Arc<dyn LinkLayer>, sink: Arc<dyn EventSink>) -> Self {
        Self { link, sink }
    }

    /// Sweeps `range` from `intf` and returns the hosts that answered,
    /// sorted by address. The first reply per address wins. An empty
    /// result is not an error.
    pub fn discover(
        &self,
        intf: &NetworkInterface,
        range: &CidrRange,
        timeout: Duration,
    ) -> Result<Vec<Device>, ScanError> {
        if !self.link.has_privilege() {
            return Err(ScanError::Privilege(
                "ARP sweeps need root (Unix) or an elevated shell (Windows)".to_string(),
            ));
        }

        let (src_mac, src_ip) = sender_identity(intf, range)?;
        let (mut tx, mut rx) = self.link.open(intf).map_err(|e| open_error(intf, e))?;

        let targets: BTreeSet<Ipv4Addr> = range.hosts().filter(|ip| *ip != src_ip).collect();
        self.sink.emit(ScanEvent::SweepStarted {
            range: *range,
            targets: targets.len(),
        });
        debug!("Sweeping {range} from {src_ip} on {} ({} targets)", intf.name, targets.len());

        send_requests(tx.as_mut(), src_mac, src_ip, &targets);
        let devices = self.listen_for_replies(rx.as_mut(), &targets, timeout);

        success!("Sweep of {range} found {} device(s)", devices.len());
        self.sink.emit(ScanEvent::SweepFinished {
            devices: devices.len(),
        });
        Ok(devices)
    }

    fn listen_for_replies(
        &self,
        rx: &mut dyn DataLinkReceiver,
        targets: &BTreeSet<Ipv4Addr>,
        timeout: Duration,
    ) -> Vec<Device> {
        let mut found: BTreeMap<Ipv4Addr, Device> = BTreeMap::new();
        let deadline = Instant::now() + timeout;

        while Instant::now() < deadline && found.len() < targets.len() {
            let Ok(frame) = rx.next() else {
                // Read timeouts land here; the deadline check decides.
                continue;
            };
            let Some((ip, mac)) = arp::parse_reply(frame) else {
                continue;
            };
            if !targets.contains(&ip) || found.contains_key(&ip) {
                continue;
            }

            let device = Device::new(ip, mac);
            debug!("ARP reply from {device}");
            self.sink.emit(ScanEvent::DeviceFound(device));
            found.insert(ip, device);
        }

        found.into_values().collect()
    }
}

/// Source hardware address and the IPv4 address to announce. An address
/// inside the swept range is preferred so replies come back on-link.
fn sender_identity(intf: &NetworkInterface, range: &CidrRange) -> Result<(MacAddr, Ipv4Addr), ScanError> {
    let mac = intf
        .mac
        .filter(|mac| *mac != MacAddr::zero())
        .ok_or_else(|| ScanError::Interface {
            name: intf.name.clone(),
            reason: "no hardware address".to_string(),
        })?;

    let nets = intf.get_ipv4_nets();
    let ip = nets
        .iter()
        .map(|net| net.ip())
        .find(|ip| range.contains(*ip))
        .or_else(|| nets.first().map(|net| net.ip()))
        .ok_or_else(|| ScanError::Interface {
            name: intf.name.clone(),
            reason: "no IPv4 address".to_string(),
        })?;

    Ok((mac, ip))
}

fn open_error(intf: &NetworkInterface, e: io::Error) -> ScanError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => {
            ScanError::Privilege(format!("opening a raw channel on {} was denied: {e}", intf.name))
        }
        _ => ScanError::Link {
            interface: intf.name.clone(),
            source: e,
        },
    }
}

fn send_requests(tx: &mut dyn DataLinkSender, src_mac: MacAddr, src_ip: Ipv4Addr, targets: &BTreeSet<Ipv4Addr>) {
    let mut failed = 0usize;
    for target in targets {
        let sent = arp::create_request(src_mac, src_ip, *target)
            .ok()
            .and_then(|packet| tx.send_to(&packet, None));
        if !matches!(sent, Some(Ok(()))) {
            failed += 1;
        }
    }
    if failed > 0 {
        warn!("{failed} of {} ARP requests could not be sent", targets.len());
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
