use std::net::Ipv4Addr;

use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperation, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::util::MacAddr;

use crate::PacketError;
use crate::ethernet::{self, ETH_HDR_LEN, MIN_ETH_FRAME_NO_FCS};

pub const ARP_LEN: usize = 28;

/// Sender half of an ARP reply, the only part a resolver cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpReply {
    pub sender_mac: MacAddr,
    pub sender_addr: Ipv4Addr,
}

/// Broadcast "who has `target_addr`" request with a zeroed target hardware field.
pub fn create_request(
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    target_addr: Ipv4Addr,
) -> Result<Vec<u8>, PacketError> {
    create_packet(
        ArpOperations::Request,
        MacAddr::broadcast(),
        (src_mac, src_addr),
        (MacAddr::zero(), target_addr),
    )
}

/// Unicast "`src_addr` is at `src_mac`" reply addressed to the asking host.
pub fn create_reply(
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    dst_mac: MacAddr,
    dst_addr: Ipv4Addr,
) -> Result<Vec<u8>, PacketError> {
    create_packet(
        ArpOperations::Reply,
        dst_mac,
        (src_mac, src_addr),
        (dst_mac, dst_addr),
    )
}

fn create_packet(
    operation: ArpOperation,
    eth_dst: MacAddr,
    (sender_mac, sender_addr): (MacAddr, Ipv4Addr),
    (target_mac, target_addr): (MacAddr, Ipv4Addr),
) -> Result<Vec<u8>, PacketError> {
    let mut buffer = [0u8; MIN_ETH_FRAME_NO_FCS];
    ethernet::make_header(&mut buffer, sender_mac, eth_dst, EtherTypes::Arp)?;
    let mut arp = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .ok_or(PacketError::ArpBuffer)?;
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(operation);
    arp.set_sender_hw_addr(sender_mac);
    arp.set_sender_proto_addr(sender_addr);
    arp.set_target_hw_addr(target_mac);
    arp.set_target_proto_addr(target_addr);
    Ok(Vec::from(buffer))
}

/// Reads an ARP reply out of a raw ethernet frame.
///
/// Anything else, including requests and truncated frames, yields `None`.
pub fn parse_reply(frame: &[u8]) -> Option<ArpReply> {
    let eth = EthernetPacket::new(frame)?;
    if eth.get_ethertype() != EtherTypes::Arp {
        return None;
    }
    let arp = ArpPacket::new(eth.payload())?;
    if arp.get_operation() != ArpOperations::Reply
        || arp.get_protocol_type() != EtherTypes::Ipv4
        || arp.get_hw_addr_len() != 6
        || arp.get_proto_addr_len() != 4
    {
        return None;
    }
    Some(ArpReply {
        sender_mac: arp.get_sender_hw_addr(),
        sender_addr: arp.get_sender_proto_addr(),
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
