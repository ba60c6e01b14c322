use std::net::Ipv4Addr;

use pnet::packet::ip::IpNextHeaderProtocol;
use pnet::packet::ipv4::{self, Ipv4Flags, MutableIpv4Packet};

use crate::PacketError;

pub const IPV4_HDR_LEN: usize = 20;
pub const PROBE_TTL: u8 = 255;

/// Writes a 20 byte IPv4 header with the don't-fragment bit set.
///
/// Total length and checksum are derived from `payload_len` and the fields
/// written here, never taken from the caller.
pub fn write_header(
    buffer: &mut [u8],
    payload_len: usize,
    next_protocol: IpNextHeaderProtocol,
    src_addr: Ipv4Addr,
    dst_addr: Ipv4Addr,
) -> Result<(), PacketError> {
    let total_length =
        u16::try_from(IPV4_HDR_LEN + payload_len).map_err(|_| PacketError::Oversized(payload_len))?;
    let mut ip = MutableIpv4Packet::new(buffer).ok_or(PacketError::Ipv4Buffer)?;
    ip.set_version(4);
    ip.set_header_length(5);
    ip.set_dscp(0);
    ip.set_ecn(0);
    ip.set_total_length(total_length);
    ip.set_identification(0);
    ip.set_flags(Ipv4Flags::DontFragment);
    ip.set_fragment_offset(0);
    ip.set_ttl(PROBE_TTL);
    ip.set_next_level_protocol(next_protocol);
    ip.set_source(src_addr);
    ip.set_destination(dst_addr);
    ip.set_checksum(0);
    let csm = ipv4::checksum(&ip.to_immutable());
    ip.set_checksum(csm);
    Ok(())
}
