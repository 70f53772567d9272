//! In-memory doubles for the OS-facing traits.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pnet::datalink::{DataLinkReceiver, DataLinkSender, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use pnet::util::MacAddr;
use seekr_common::analysis::{HttpInfo, TlsInfo};
use seekr_common::error::{HttpError, ScanError, TlsError};
use seekr_common::event::{EventSink, ScanEvent};
use seekr_common::network::interface::NetworkContext;
use seekr_common::network::range::CidrRange;
use seekr_common::system::SystemRepository;
use seekr_protocols::arp;

use crate::network::ServiceProber;
use crate::network::channel::{EthernetChannel, LinkLayer};
use crate::network::tcp::{ConnectOutcome, Connector};

pub const LOCAL_MAC: MacAddr = MacAddr(0x02, 0x00, 0x00, 0x00, 0x00, 0x01);

pub fn lan_interface(name: &str, ip: Ipv4Addr, prefix: u8) -> NetworkInterface {
    NetworkInterface {
        name: name.to_string(),
        description: "simulated".to_string(),
        index: 1,
        mac: Some(LOCAL_MAC),
        ips: vec![IpNetwork::V4(Ipv4Network::new(ip, prefix).unwrap())],
        flags: 0,
    }
}

// ─── Link layer ─────────────────────────────────────────────────────────────

/// A broadcast domain where configured hosts answer ARP requests.
#[derive(Default)]
pub struct SimulatedLan {
    responders: Mutex<Vec<(Ipv4Addr, MacAddr)>>,
    unsolicited: Mutex<Vec<Vec<u8>>>,
    frames_sent: Arc<AtomicUsize>,
    unprivileged: AtomicBool,
    open_error: Mutex<Option<io::ErrorKind>>,
}

impl SimulatedLan {
    pub fn with_responders(responders: &[(Ipv4Addr, MacAddr)]) -> Arc<Self> {
        let lan = Self::default();
        lan.set_responders(responders);
        Arc::new(lan)
    }

    /// Replaces the hosts that answer. Listing an address twice makes it
    /// answer twice.
    pub fn set_responders(&self, responders: &[(Ipv4Addr, MacAddr)]) {
        *self.responders.lock().unwrap() = responders.to_vec();
    }

    /// Frames delivered to the next channel before any reply.
    pub fn inject(&self, frame: Vec<u8>) {
        self.unsolicited.lock().unwrap().push(frame);
    }

    pub fn revoke_privilege(&self) {
        self.unprivileged.store(true, Ordering::SeqCst);
    }

    pub fn fail_open(&self, kind: io::ErrorKind) {
        *self.open_error.lock().unwrap() = Some(kind);
    }

    pub fn frames_sent(&self) -> usize {
        self.frames_sent.load(Ordering::SeqCst)
    }
}

impl LinkLayer for SimulatedLan {
    fn has_privilege(&self) -> bool {
        !self.unprivileged.load(Ordering::SeqCst)
    }

    fn open(&self, _intf: &NetworkInterface) -> io::Result<EthernetChannel> {
        if let Some(kind) = *self.open_error.lock().unwrap() {
            return Err(io::Error::new(kind, "simulated open failure"));
        }

        let inbox: Arc<Mutex<VecDeque<Vec<u8>>>> = Arc::new(Mutex::new(
            self.unsolicited.lock().unwrap().drain(..).collect(),
        ));
        let tx = SimSender {
            responders: self.responders.lock().unwrap().clone(),
            frames_sent: Arc::clone(&self.frames_sent),
            inbox: Arc::clone(&inbox),
        };
        let rx = SimReceiver {
            inbox,
            current: Vec::new(),
        };
        Ok((Box::new(tx), Box::new(rx)))
    }
}

struct SimSender {
    responders: Vec<(Ipv4Addr, MacAddr)>,
    frames_sent: Arc<AtomicUsize>,
    inbox: Arc<Mutex<VecDeque<Vec<u8>>>>,
}

impl DataLinkSender for SimSender {
    fn build_and_send(
        &mut self,
        num_packets: usize,
        packet_size: usize,
        func: &mut dyn FnMut(&mut [u8]),
    ) -> Option<io::Result<()>> {
        for _ in 0..num_packets {
            let mut buffer = vec![0u8; packet_size];
            func(&mut buffer);
            self.send_to(&buffer, None);
        }
        Some(Ok(()))
    }

    fn send_to(&mut self, packet: &[u8], _dst: Option<NetworkInterface>) -> Option<io::Result<()>> {
        self.frames_sent.fetch_add(1, Ordering::SeqCst);

        let Ok(request) = arp::parse(packet) else {
            return Some(Ok(()));
        };
        if !request.is_request() {
            return Some(Ok(()));
        }

        for (ip, mac) in &self.responders {
            if *ip == request.target_ip {
                if let Ok(reply) = arp::create_reply(*mac, *ip, request.sender_mac, request.sender_ip) {
                    self.inbox.lock().unwrap().push_back(reply);
                }
            }
        }
        Some(Ok(()))
    }
}

struct SimReceiver {
    inbox: Arc<Mutex<VecDeque<Vec<u8>>>>,
    current: Vec<u8>,
}

impl DataLinkReceiver for SimReceiver {
    fn next(&mut self) -> io::Result<&[u8]> {
        let frame = self.inbox.lock().unwrap().pop_front();
        match frame {
            Some(frame) => {
                self.current = frame;
                Ok(&self.current)
            }
            None => {
                std::thread::sleep(Duration::from_millis(5));
                Err(io::Error::new(io::ErrorKind::TimedOut, "read timeout"))
            }
        }
    }
}

// ─── TCP ────────────────────────────────────────────────────────────────────

/// Answers connects from a fixed table and records how many were in flight.
#[derive(Default)]
pub struct ScriptedConnector {
    open: BTreeSet<u16>,
    exhausted: BTreeSet<u16>,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    attempts: AtomicUsize,
}

impl ScriptedConnector {
    pub fn open(ports: &[u16]) -> Self {
        Self {
            open: ports.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn with_exhausted(mut self, ports: &[u16]) -> Self {
        self.exhausted = ports.iter().copied().collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, addr: SocketAddrV4, _connect_timeout: Duration) -> ConnectOutcome {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let port = addr.port();
        if self.exhausted.contains(&port) {
            ConnectOutcome::Exhausted(io::Error::from_raw_os_error(24))
        } else if self.open.contains(&port) {
            ConnectOutcome::Open
        } else {
            ConnectOutcome::NotOpen
        }
    }
}

// ─── Probes ─────────────────────────────────────────────────────────────────

pub fn tls_info(common_name: &str) -> TlsInfo {
    let names = BTreeMap::from([("commonName".to_string(), common_name.to_string())]);
    TlsInfo {
        issuer: names.clone(),
        subject: names,
        protocol_version: "TLSv1.3".to_string(),
        serial_number: "0A1B".to_string(),
    }
}

pub fn http_info(server: &str) -> HttpInfo {
    HttpInfo {
        status_code: 200,
        server_header: Some(server.to_string()),
        content_type: Some("text/html".to_string()),
    }
}

/// Returns canned probe results per port. Unlisted ports fail.
#[derive(Default)]
pub struct ScriptedProber {
    tls: BTreeMap<u16, Result<TlsInfo, TlsError>>,
    http: BTreeMap<u16, Result<HttpInfo, HttpError>>,
    calls: Mutex<Vec<(&'static str, u16)>>,
}

impl ScriptedProber {
    pub fn tls(mut self, port: u16, result: Result<TlsInfo, TlsError>) -> Self {
        self.tls.insert(port, result);
        self
    }

    pub fn http(mut self, port: u16, result: Result<HttpInfo, HttpError>) -> Self {
        self.http.insert(port, result);
        self
    }

    pub fn calls(&self) -> Vec<(&'static str, u16)> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort_unstable();
        calls
    }
}

#[async_trait]
impl ServiceProber for ScriptedProber {
    async fn probe_tls(&self, _ip: Ipv4Addr, port: u16, _timeout: Duration) -> Result<TlsInfo, TlsError> {
        self.calls.lock().unwrap().push(("tls", port));
        self.tls
            .get(&port)
            .cloned()
            .unwrap_or_else(|| Err(TlsError::new("connection refused")))
    }

    async fn probe_http(&self, _ip: Ipv4Addr, port: u16, _timeout: Duration) -> Result<HttpInfo, HttpError> {
        self.calls.lock().unwrap().push(("http", port));
        self.http
            .get(&port)
            .cloned()
            .unwrap_or_else(|| Err(HttpError::new("connection refused")))
    }
}

// ─── Sink and system ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ScanEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ScanEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: ScanEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A host at a fixed address on a single named interface.
pub struct FixedSystem {
    pub context: Option<NetworkContext>,
    pub interface: NetworkInterface,
}

impl FixedSystem {
    pub fn at(ip: Ipv4Addr, prefix: u8) -> Self {
        let name = "sim0";
        Self {
            context: Some(NetworkContext {
                local_ip: ip,
                interface_name: Some(name.to_string()),
                cidr_range: CidrRange::new(ip, prefix).unwrap(),
            }),
            interface: lan_interface(name, ip, prefix),
        }
    }

    pub fn offline() -> Self {
        Self {
            context: None,
            interface: lan_interface("sim0", Ipv4Addr::new(10, 0, 0, 1), 24),
        }
    }
}

impl SystemRepository for FixedSystem {
    fn resolve_identity(&self, prefix: u8) -> Result<NetworkContext, ScanError> {
        let mut context = self
            .context
            .clone()
            .ok_or_else(|| ScanError::NoRoute("network is unreachable".to_string()))?;
        context.cidr_range = CidrRange::new(context.local_ip, prefix)?;
        Ok(context)
    }

    fn interface_by_name(&self, name: &str) -> Option<NetworkInterface> {
        (self.interface.name == name).then(|| self.interface.clone())
    }
}
