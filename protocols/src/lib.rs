//! Packet codec for the frames a SYN scan puts on and reads off the wire.
//!
//! Builders always produce complete ethernet frames with lengths and checksums
//! recomputed. [`frame::decode`] and [`arp::parse_reply`] accept arbitrary bytes.

pub mod arp;
pub mod ethernet;
pub mod frame;
pub mod ipv4;
pub mod tcp;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("buffer too small for an ethernet header")]
    EthernetBuffer,
    #[error("buffer too small for an ARP packet")]
    ArpBuffer,
    #[error("buffer too small for an IPv4 header")]
    Ipv4Buffer,
    #[error("buffer too small for a TCP header")]
    TcpBuffer,
    #[error("payload of {0} bytes does not fit an IPv4 packet")]
    Oversized(usize),
}
