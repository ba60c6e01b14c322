//! Mapping of captured frames to port states.
//!
//! Every frame read during a scan ends up in exactly one [`Classification`].
//! The reasons a frame is dropped are spelled out in [`NotRelevant`].

use scanr_protocols::frame;

use super::session::{PortResults, PortState, ScanSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Open(u16),
    Closed(u16),
    NotRelevant(NotRelevant),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotRelevant {
    /// Not even an ethernet header.
    Undecodable,
    NoNetworkLayer,
    /// IPv4 endpoints are not the scanner and the target.
    ForeignFlow,
    NoTransportLayer,
    /// Not addressed to the session's source port.
    WrongDestinationPort,
    UnrequestedPort,
    AlreadyRecorded,
    /// Neither RST nor SYN+ACK.
    UninterestingFlags,
}

impl Classification {
    pub fn port_state(&self) -> Option<(u16, PortState)> {
        match *self {
            Classification::Open(port) => Some((port, PortState::Open)),
            Classification::Closed(port) => Some((port, PortState::Closed)),
            Classification::NotRelevant(_) => None,
        }
    }
}

/// Classifies one captured frame against the session and what is already recorded.
pub fn classify(bytes: &[u8], session: &ScanSession, results: &PortResults) -> Classification {
    use Classification::NotRelevant as Skip;

    let Some(decoded) = frame::decode(bytes) else {
        return Skip(NotRelevant::Undecodable);
    };
    let Some(ip) = decoded.ipv4 else {
        return Skip(NotRelevant::NoNetworkLayer);
    };

    let source = session.source();
    let target = session.target();
    let inbound = ip.source == target && ip.destination == source;
    let outbound = ip.source == source && ip.destination == target;
    if !(inbound || outbound) {
        return Skip(NotRelevant::ForeignFlow);
    }

    let Some(tcp) = decoded.tcp else {
        return Skip(NotRelevant::NoTransportLayer);
    };
    if tcp.destination != session.src_port() {
        return Skip(NotRelevant::WrongDestinationPort);
    }

    let port = tcp.source;
    if !session.is_requested(port) {
        return Skip(NotRelevant::UnrequestedPort);
    }
    if results.contains(port) {
        return Skip(NotRelevant::AlreadyRecorded);
    }

    if tcp.is_rst() {
        Classification::Closed(port)
    } else if tcp.is_syn_ack() {
        Classification::Open(port)
    } else {
        Skip(NotRelevant::UninterestingFlags)
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
