use std::fmt;
use std::net::Ipv4Addr;

/// Path towards a target, resolved once before a scan starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteInfo {
    /// Present only when the target is not on a directly attached network.
    pub gateway: Option<Ipv4Addr>,
    pub source: Ipv4Addr,
}

impl RouteInfo {
    pub fn direct(source: Ipv4Addr) -> Self {
        Self {
            gateway: None,
            source,
        }
    }

    pub fn via(gateway: Ipv4Addr, source: Ipv4Addr) -> Self {
        Self {
            gateway: Some(gateway),
            source,
        }
    }

    /// The address whose hardware address frames must be sent to.
    pub fn next_hop(&self, target: Ipv4Addr) -> Ipv4Addr {
        self.gateway.unwrap_or(target)
    }
}

impl fmt::Display for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.gateway {
            Some(gateway) => write!(f, "via {gateway} from {}", self.source),
            None => write!(f, "on-link from {}", self.source),
        }
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
