//! ARP over Ethernet: request construction and reply parsing.

use std::net::Ipv4Addr;

use anyhow::{Context, bail};
use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperation, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::util::MacAddr;

use crate::{ARP_LEN, ETH_HDR_LEN, MIN_ETH_FRAME_NO_FCS, ethernet};

/// The fields of an ARP message that discovery cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpFrame {
    pub operation: ArpOperation,
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

impl ArpFrame {
    pub fn is_reply(&self) -> bool {
        self.operation == ArpOperations::Reply
    }

    pub fn is_request(&self) -> bool {
        self.operation == ArpOperations::Request
    }
}

/// Broadcast "who has `target_ip`" frame, padded to the Ethernet minimum.
pub fn create_request(
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    target_addr: Ipv4Addr,
) -> anyhow::Result<Vec<u8>> {
    create_packet(
        ArpOperations::Request,
        src_mac,
        MacAddr::broadcast(),
        src_addr,
        MacAddr::zero(),
        target_addr,
    )
}

/// Unicast "`src_addr` is at `src_mac`" answer to a request.
pub fn create_reply(
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    dst_mac: MacAddr,
    dst_addr: Ipv4Addr,
) -> anyhow::Result<Vec<u8>> {
    create_packet(ArpOperations::Reply, src_mac, dst_mac, src_addr, dst_mac, dst_addr)
}

fn create_packet(
    operation: ArpOperation,
    src_mac: MacAddr,
    eth_dst: MacAddr,
    src_addr: Ipv4Addr,
    target_mac: MacAddr,
    target_addr: Ipv4Addr,
) -> anyhow::Result<Vec<u8>> {
    let mut buffer = [0u8; MIN_ETH_FRAME_NO_FCS];
    ethernet::make_header(&mut buffer, src_mac, eth_dst, EtherTypes::Arp)?;
    let mut arp_packet = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .context("failed to create mutable ARP packet")?;
    arp_packet.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp_packet.set_protocol_type(EtherTypes::Ipv4);
    arp_packet.set_hw_addr_len(6);
    arp_packet.set_proto_addr_len(4);
    arp_packet.set_operation(operation);
    arp_packet.set_sender_hw_addr(src_mac);
    arp_packet.set_target_hw_addr(target_mac);
    arp_packet.set_sender_proto_addr(src_addr);
    arp_packet.set_target_proto_addr(target_addr);
    Ok(Vec::from(buffer))
}

/// Decodes a raw Ethernet frame carrying ARP.
pub fn parse(bytes: &[u8]) -> anyhow::Result<ArpFrame> {
    let eth_frame: EthernetPacket = ethernet::get_packet_from_u8(bytes)?;
    if eth_frame.get_ethertype() != EtherTypes::Arp {
        bail!("not an ARP frame (ethertype {:?})", eth_frame.get_ethertype());
    }

    let arp_packet = ArpPacket::new(eth_frame.payload()).with_context(|| {
        format!(
            "truncated or invalid ARP packet (payload len {})",
            eth_frame.payload().len()
        )
    })?;

    Ok(ArpFrame {
        operation: arp_packet.get_operation(),
        sender_mac: arp_packet.get_sender_hw_addr(),
        sender_ip: arp_packet.get_sender_proto_addr(),
        target_mac: arp_packet.get_target_hw_addr(),
        target_ip: arp_packet.get_target_proto_addr(),
    })
}

/// `(sender ip, sender mac)` of an ARP reply. Requests and foreign
/// traffic yield `None`.
pub fn parse_reply(bytes: &[u8]) -> Option<(Ipv4Addr, MacAddr)> {
    parse(bytes)
        .ok()
        .filter(ArpFrame::is_reply)
        .map(|frame| (frame.sender_ip, frame.sender_mac))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
