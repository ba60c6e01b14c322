use std::net::Ipv4Addr;

use pnet::packet::ethernet::EtherTypes;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::tcp::{self, MutableTcpPacket, TcpFlags};
use pnet::util::MacAddr;

use crate::PacketError;
use crate::ethernet::{self, ETH_HDR_LEN};
use crate::ipv4::{self, IPV4_HDR_LEN};

pub const TCP_HDR_LEN: usize = 20;
pub const SYN_WINDOW: u16 = 65_535;
pub const SYN_FRAME_LEN: usize = ETH_HDR_LEN + IPV4_HDR_LEN + TCP_HDR_LEN;

/// Everything about a SYN probe that stays fixed for a whole scan.
///
/// Only the destination port changes between frames built from one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynTemplate {
    pub src_mac: MacAddr,
    pub dst_mac: MacAddr,
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
    pub src_port: u16,
    pub sequence: u32,
}

impl SynTemplate {
    /// Serializes an Ethernet/IPv4/TCP SYN frame towards `dst_port`.
    pub fn build(&self, dst_port: u16) -> Result<Vec<u8>, PacketError> {
        let mut buffer = vec![0u8; SYN_FRAME_LEN];
        ethernet::make_header(&mut buffer, self.src_mac, self.dst_mac, EtherTypes::Ipv4)?;

        {
            let mut tcp = MutableTcpPacket::new(&mut buffer[ETH_HDR_LEN + IPV4_HDR_LEN..])
                .ok_or(PacketError::TcpBuffer)?;
            tcp.set_source(self.src_port);
            tcp.set_destination(dst_port);
            tcp.set_sequence(self.sequence);
            tcp.set_acknowledgement(0);
            tcp.set_data_offset(5);
            tcp.set_flags(TcpFlags::SYN);
            tcp.set_window(SYN_WINDOW);
            tcp.set_urgent_ptr(0);
            tcp.set_checksum(0);
            let csm = tcp::ipv4_checksum(&tcp.to_immutable(), &self.src_addr, &self.dst_addr);
            tcp.set_checksum(csm);
        }

        ipv4::write_header(
            &mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + IPV4_HDR_LEN],
            TCP_HDR_LEN,
            IpNextHeaderProtocols::Tcp,
            self.src_addr,
            self.dst_addr,
        )?;

        Ok(buffer)
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
