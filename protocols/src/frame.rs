//! Tolerant decoding of captured frames.
//!
//! Every buffer handed in here comes straight off the wire. Decoding stops at
//! the first layer that does not fit and reports what was understood so far.

use std::net::Ipv4Addr;

use pnet::packet::Packet;
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::tcp::{TcpFlags, TcpPacket};

use crate::ipv4::IPV4_HDR_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeader {
    pub source: u16,
    pub destination: u16,
    pub flags: u8,
}

impl TcpHeader {
    pub fn is_rst(&self) -> bool {
        self.flags & TcpFlags::RST != 0
    }

    pub fn is_syn_ack(&self) -> bool {
        self.flags & (TcpFlags::SYN | TcpFlags::ACK) == TcpFlags::SYN | TcpFlags::ACK
    }
}

/// Layers found in a captured ethernet frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodedFrame {
    pub ipv4: Option<Ipv4Header>,
    pub tcp: Option<TcpHeader>,
}

/// Decodes `bytes` starting from the ethernet header.
///
/// Returns `None` when not even the ethernet header is present.
pub fn decode(bytes: &[u8]) -> Option<DecodedFrame> {
    let eth = EthernetPacket::new(bytes)?;
    if eth.get_ethertype() != EtherTypes::Ipv4 {
        return Some(DecodedFrame::default());
    }

    let Some(ip) = valid_ipv4(eth.payload()) else {
        return Some(DecodedFrame::default());
    };
    let ipv4 = Ipv4Header {
        source: ip.get_source(),
        destination: ip.get_destination(),
    };

    let tcp = (ip.get_next_level_protocol() == IpNextHeaderProtocols::Tcp
        && ip.get_fragment_offset() == 0)
        .then(|| ip.payload())
        .filter(|segment| segment.len() >= TcpPacket::minimum_packet_size())
        .map(|segment| {
            // Length was checked against the fixed header size above.
            let tcp = TcpPacket::new(segment).expect("TCP segment shorter than its fixed header");
            TcpHeader {
                source: tcp.get_source(),
                destination: tcp.get_destination(),
                flags: tcp.get_flags(),
            }
        });

    Some(DecodedFrame {
        ipv4: Some(ipv4),
        tcp,
    })
}

fn valid_ipv4(bytes: &[u8]) -> Option<Ipv4Packet<'_>> {
    let ip = Ipv4Packet::new(bytes)?;
    let header_len = ip.get_header_length() as usize * 4;
    if ip.get_version() != 4 || header_len < IPV4_HDR_LEN || header_len > bytes.len() {
        return None;
    }
    Some(ip)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
