use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use pnet::packet::Packet;
use pnet::packet::arp::{ArpOperations, ArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::tcp::{self, MutableTcpPacket, TcpFlags, TcpPacket};
use pnet::util::MacAddr;
use scanr_common::network::interface::LinkInterface;
use scanr_core::network::channel::{CaptureHandle, ReadError};
use scanr_protocols::arp;
use scanr_protocols::ethernet::ETH_HDR_LEN;
use scanr_protocols::ipv4::IPV4_HDR_LEN;
use scanr_protocols::tcp::SynTemplate;

pub const LOCAL_MAC: MacAddr = MacAddr(0x02, 0x00, 0x00, 0x00, 0x00, 0x0a);
pub const LOCAL_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);

pub fn ni(
    name: &str,
    index: u32,
    mac: Option<MacAddr>,
    ips: &[IpNetwork],
    flags: u32,
) -> NetworkInterface {
    NetworkInterface {
        name: name.into(),
        description: "".into(),
        index,
        mac,
        ips: ips.to_vec(),
        flags,
    }
}

pub fn v4(a: u8, b: u8, c: u8, d: u8, p: u8) -> IpNetwork {
    IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(a, b, c, d), p).unwrap())
}

/// The scanning host's interface on `192.168.1.0/24`.
pub fn local_link() -> LinkInterface {
    let intf = ni("eth0", 2, Some(LOCAL_MAC), &[v4(192, 168, 1, 10, 24)], 1);
    LinkInterface::try_from(&intf).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortBehaviour {
    Open,
    Closed,
    Silent,
}

/// A host that answers SYN probes.
#[derive(Debug, Clone)]
pub struct SimulatedHost {
    pub addr: Ipv4Addr,
    /// Hardware address frames for this host must be sent to.
    pub reached_via: MacAddr,
    pub ports: HashMap<u16, PortBehaviour>,
    /// Every answer is put on the wire this many times.
    pub copies: usize,
}

impl SimulatedHost {
    pub fn new(addr: Ipv4Addr, reached_via: MacAddr) -> Self {
        Self {
            addr,
            reached_via,
            ports: HashMap::new(),
            copies: 1,
        }
    }

    pub fn open(mut self, ports: &[u16]) -> Self {
        self.ports.extend(ports.iter().map(|p| (*p, PortBehaviour::Open)));
        self
    }

    pub fn closed(mut self, ports: &[u16]) -> Self {
        self.ports.extend(ports.iter().map(|p| (*p, PortBehaviour::Closed)));
        self
    }

    pub fn answering_twice(mut self) -> Self {
        self.copies = 2;
        self
    }

    fn behaviour(&self, port: u16) -> PortBehaviour {
        self.ports.get(&port).copied().unwrap_or(PortBehaviour::Silent)
    }
}

/// An ethernet segment seen through a capture handle.
///
/// Stations answer ARP requests for their address. Hosts answer SYN probes
/// only when the probe carries the right next hop hardware address.
pub struct SimulatedLan {
    stations: Vec<(Ipv4Addr, MacAddr)>,
    hosts: Vec<SimulatedHost>,
    chatter: Vec<Vec<u8>>,
    inbox: VecDeque<Vec<u8>>,
    current: Vec<u8>,
    idle: Duration,
    pub written: Vec<Vec<u8>>,
}

impl Default for SimulatedLan {
    fn default() -> Self {
        Self {
            stations: Vec::new(),
            hosts: Vec::new(),
            chatter: Vec::new(),
            inbox: VecDeque::new(),
            current: Vec::new(),
            idle: Duration::from_millis(2),
            written: Vec::new(),
        }
    }
}

impl SimulatedLan {
    pub fn with_station(mut self, addr: Ipv4Addr, mac: MacAddr) -> Self {
        self.stations.push((addr, mac));
        self
    }

    pub fn with_host(mut self, host: SimulatedHost) -> Self {
        self.hosts.push(host);
        self
    }

    /// Frames that are read before anything else.
    pub fn with_noise(mut self, frames: impl IntoIterator<Item = Vec<u8>>) -> Self {
        self.inbox.extend(frames);
        self
    }

    /// Frames put on the wire after every SYN, ahead of the host's answer.
    pub fn with_chatter(mut self, frames: impl IntoIterator<Item = Vec<u8>>) -> Self {
        self.chatter.extend(frames);
        self
    }

    /// ARP requests written so far.
    pub fn arp_requests(&self) -> usize {
        self.written
            .iter()
            .filter_map(|frame| EthernetPacket::new(frame))
            .filter(|eth| eth.get_ethertype() == EtherTypes::Arp)
            .count()
    }

    /// Destination ports of every SYN written so far, with the frame's destination MAC.
    pub fn probes(&self) -> Vec<(MacAddr, u16)> {
        self.written
            .iter()
            .filter_map(|frame| {
                let eth = EthernetPacket::new(frame)?;
                if eth.get_ethertype() != EtherTypes::Ipv4 {
                    return None;
                }
                let ip = Ipv4Packet::new(eth.payload())?;
                let tcp = TcpPacket::new(ip.payload())?;
                Some((eth.get_destination(), tcp.get_destination()))
            })
            .collect()
    }

    fn answer(&mut self, frame: &[u8]) {
        let Some(eth) = EthernetPacket::new(frame) else {
            return;
        };
        let ethertype = eth.get_ethertype();
        if ethertype == EtherTypes::Arp {
            self.answer_arp(&eth);
        } else if ethertype == EtherTypes::Ipv4 {
            self.answer_syn(&eth);
        }
    }

    fn answer_arp(&mut self, eth: &EthernetPacket) {
        let Some(request) = ArpPacket::new(eth.payload()) else {
            return;
        };
        if request.get_operation() != ArpOperations::Request {
            return;
        }
        let wanted = request.get_target_proto_addr();
        let Some(&(addr, mac)) = self.stations.iter().find(|(addr, _)| *addr == wanted) else {
            return;
        };
        let asker_mac = request.get_sender_hw_addr();
        let asker_addr = request.get_sender_proto_addr();
        let reply = arp::create_reply(mac, addr, asker_mac, asker_addr).unwrap();
        self.inbox.push_back(reply);
    }

    fn answer_syn(&mut self, eth: &EthernetPacket) {
        let Some(ip) = Ipv4Packet::new(eth.payload()) else {
            return;
        };
        if ip.get_next_level_protocol() != IpNextHeaderProtocols::Tcp {
            return;
        }
        let Some(probe) = TcpPacket::new(ip.payload()) else {
            return;
        };
        if probe.get_flags() != TcpFlags::SYN {
            return;
        }
        self.inbox.extend(self.chatter.iter().cloned());
        let Some(host) = self
            .hosts
            .iter()
            .find(|h| h.addr == ip.get_destination() && h.reached_via == eth.get_destination())
        else {
            return;
        };
        let flags = match host.behaviour(probe.get_destination()) {
            PortBehaviour::Open => TcpFlags::SYN | TcpFlags::ACK,
            PortBehaviour::Closed => TcpFlags::RST | TcpFlags::ACK,
            PortBehaviour::Silent => return,
        };
        let reply = tcp_segment(
            (host.reached_via, host.addr, probe.get_destination()),
            (eth.get_source(), ip.get_source(), probe.get_source()),
            flags,
        );
        for _ in 0..host.copies {
            self.inbox.push_back(reply.clone());
        }
    }
}

impl CaptureHandle for SimulatedLan {
    fn read_frame(&mut self) -> Result<&[u8], ReadError> {
        match self.inbox.pop_front() {
            Some(frame) => {
                self.current = frame;
                Ok(&self.current)
            }
            None => {
                std::thread::sleep(self.idle);
                Err(ReadError::Timeout)
            }
        }
    }

    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.written.push(frame.to_vec());
        self.answer(frame);
        Ok(())
    }
}

/// A TCP segment with `flags` from `(mac, addr, port)` to `(mac, addr, port)`.
pub fn tcp_segment(
    from: (MacAddr, Ipv4Addr, u16),
    to: (MacAddr, Ipv4Addr, u16),
    flags: u8,
) -> Vec<u8> {
    let mut frame = SynTemplate {
        src_mac: from.0,
        dst_mac: to.0,
        src_addr: from.1,
        dst_addr: to.1,
        src_port: from.2,
        sequence: 0x5eed,
    }
    .build(to.2)
    .unwrap();

    let mut segment = MutableTcpPacket::new(&mut frame[ETH_HDR_LEN + IPV4_HDR_LEN..]).unwrap();
    segment.set_flags(flags);
    segment.set_acknowledgement(1);
    segment.set_checksum(0);
    let checksum = tcp::ipv4_checksum(&segment.to_immutable(), &from.1, &to.1);
    segment.set_checksum(checksum);
    frame
}
