//! Single target TCP SYN scanning.
//!
//! A scan runs in three stages, each of which must succeed before the next:
//! 1. [`route::resolve`] finds the gateway and source address towards the target.
//! 2. [`arp::resolve_next_hop`] learns the hardware address frames are sent to.
//! 3. [`SynScanner`] probes every requested port and classifies the replies.
//!
//! The capture handle opened for a scan is dropped on every exit path.

pub mod arp;
pub mod classify;
pub mod session;
pub mod syn;

use std::net::Ipv4Addr;
use std::time::Duration;

use pnet::util::MacAddr;
use rand::Rng;
use scanr_common::config::ScanConfig;
use scanr_common::error::ScanError;
use scanr_common::network::interface::LinkInterface;
use scanr_common::network::route::RouteInfo;
use tracing::warn;

use crate::network::channel::{CaptureHandle, EthernetCapture};
use crate::network::route;
pub use session::{PortResults, PortState, ScanSession};
pub use syn::{ProgressFn, SynScanner};

/// Outcome of a finished scan.
///
/// Requested ports missing from `results` never answered and count as filtered.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub target: Ipv4Addr,
    pub route: RouteInfo,
    pub next_hop_mac: MacAddr,
    pub src_port: u16,
    pub requested: Vec<u16>,
    pub results: PortResults,
    /// The scan ended on its timeout rather than with every port classified.
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl ScanReport {
    pub fn open(&self) -> Vec<u16> {
        self.results.with_state(PortState::Open)
    }

    pub fn closed(&self) -> Vec<u16> {
        self.results.with_state(PortState::Closed)
    }

    /// Requested ports without a recorded state, in request order.
    pub fn filtered(&self) -> Vec<u16> {
        self.requested
            .iter()
            .copied()
            .filter(|port| !self.results.contains(*port))
            .collect()
    }
}

/// Scans `ports` of `target` through `interface`.
pub fn run_syn_scan<R: Rng>(
    interface: &LinkInterface,
    target: Ipv4Addr,
    ports: Vec<u16>,
    cfg: &ScanConfig,
    rng: &mut R,
    on_progress: Option<ProgressFn>,
) -> Result<ScanReport, ScanError> {
    let route = route::resolve(target)?;
    let mut capture = EthernetCapture::open(interface.datalink(), cfg)?;
    scan_with_capture(&mut capture, interface, target, route, ports, cfg, rng, on_progress)
}

/// Runs next hop resolution and the scan loop over an already open capture handle.
#[allow(clippy::too_many_arguments)]
pub fn scan_with_capture<C, R>(
    capture: &mut C,
    interface: &LinkInterface,
    target: Ipv4Addr,
    route: RouteInfo,
    ports: Vec<u16>,
    cfg: &ScanConfig,
    rng: &mut R,
    on_progress: Option<ProgressFn>,
) -> Result<ScanReport, ScanError>
where
    C: CaptureHandle + ?Sized,
    R: Rng,
{
    if !interface.owns(route.source) {
        warn!(
            "Source address {} is not configured on {}, replies may not be captured",
            route.source, interface.name
        );
    }
    let next_hop_mac = arp::resolve_next_hop(
        capture,
        interface,
        route.source,
        route.next_hop(target),
        cfg.arp_timeout,
    )?;
    let session = ScanSession::new(interface.clone(), route.source, target, ports, cfg, rng);
    let report = SynScanner::new(session, route, next_hop_mac)
        .with_progress(on_progress)
        .run(capture);
    Ok(report)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
