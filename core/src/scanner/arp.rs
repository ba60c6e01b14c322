//! Next hop hardware address resolution.

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use pnet::util::MacAddr;
use scanr_common::error::{PacketIoError, ScanError};
use scanr_common::network::interface::LinkInterface;
use scanr_common::network::mac;
use scanr_protocols::arp;
use tracing::{debug, info, trace, warn};

use crate::network::channel::{CaptureHandle, ReadError};

/// Broadcasts one ARP request for `arp_target` and waits up to `timeout` for its reply.
///
/// The request is never repeated. Only a reply whose sender protocol address
/// is exactly `arp_target` is accepted. Read failures are logged and the wait goes on.
pub fn resolve_next_hop<C: CaptureHandle + ?Sized>(
    capture: &mut C,
    interface: &LinkInterface,
    source: Ipv4Addr,
    arp_target: Ipv4Addr,
    timeout: Duration,
) -> Result<MacAddr, ScanError> {
    let request = arp::create_request(interface.mac, source, arp_target).map_err(|e| {
        ScanError::ResolutionSendFailure {
            target: arp_target,
            source: PacketIoError::Build(e.to_string()),
        }
    })?;
    capture
        .write_frame(&request)
        .map_err(|e| ScanError::ResolutionSendFailure {
            target: arp_target,
            source: PacketIoError::Send(e),
        })?;
    debug!("ARP request for {arp_target} sent on {}", interface.name);

    let sent_at = Instant::now();
    while sent_at.elapsed() < timeout {
        match capture.read_frame() {
            Ok(frame) => match arp::parse_reply(frame) {
                Some(reply) if reply.sender_addr == arp_target => {
                    log_resolved(arp_target, reply.sender_mac);
                    return Ok(reply.sender_mac);
                }
                Some(reply) => trace!("Ignoring ARP reply from {}", reply.sender_addr),
                None => {}
            },
            Err(ReadError::Timeout) => {}
            Err(ReadError::Io(e)) => warn!("{}", PacketIoError::Read(e)),
        }
    }

    Err(ScanError::ResolutionTimeout {
        target: arp_target,
        waited: timeout,
    })
}

fn log_resolved(addr: Ipv4Addr, mac: MacAddr) {
    match mac::get_vendor(mac) {
        Some(vendor) => info!("Next hop {addr} is at {mac} ({vendor})"),
        None => info!("Next hop {addr} is at {mac}"),
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
