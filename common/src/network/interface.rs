use std::net::Ipv4Addr;

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use pnet::util::MacAddr;

use crate::error::ScanError;

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| match ip {
                IpNetwork::V4(ipv4) => Some(*ipv4),
                IpNetwork::V6(_) => None,
            })
            .collect()
    }
}

/// The interface a scan sends and captures on.
///
/// Resolved once from the operator supplied name and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInterface {
    pub name: String,
    pub mac: MacAddr,
    pub ipv4_nets: Vec<Ipv4Network>,
    datalink: NetworkInterface,
}

impl LinkInterface {
    /// Looks up `name` among the interfaces of this host.
    pub fn by_name(name: &str) -> Result<Self, ScanError> {
        select_by_name(name, &datalink::interfaces())
    }

    /// The pnet representation, needed to open a channel on this interface.
    pub fn datalink(&self) -> &NetworkInterface {
        &self.datalink
    }

    /// Whether `addr` is configured on this interface.
    pub fn owns(&self, addr: Ipv4Addr) -> bool {
        self.ipv4_nets.iter().any(|net| net.ip() == addr)
    }
}

impl TryFrom<&NetworkInterface> for LinkInterface {
    type Error = ScanError;

    fn try_from(interface: &NetworkInterface) -> Result<Self, Self::Error> {
        let mac = interface
            .mac
            .ok_or_else(|| ScanError::InterfaceWithoutMac(interface.name.clone()))?;
        Ok(Self {
            name: interface.name.clone(),
            mac,
            ipv4_nets: interface.get_ipv4_nets(),
            datalink: interface.clone(),
        })
    }
}

fn select_by_name(name: &str, interfaces: &[NetworkInterface]) -> Result<LinkInterface, ScanError> {
    let interface = interfaces
        .iter()
        .find(|interface| interface.name == name)
        .ok_or_else(|| ScanError::InterfaceNotFound(name.to_string()))?;
    LinkInterface::try_from(interface)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
