//! The SYN scan loop.
//!
//! One probe goes out per iteration and at most one frame is read back, so
//! sending and receiving interleave on a single capture handle. The loop ends
//! once every requested port is classified or the scan timeout runs out.

use std::time::{Duration, Instant};

use pnet::util::MacAddr;
use scanr_common::config::DeadlinePolicy;
use scanr_common::error::PacketIoError;
use scanr_common::network::route::RouteInfo;
use scanr_protocols::tcp::SynTemplate;
use tracing::{debug, info, trace, warn};

use super::ScanReport;
use super::classify::{Classification, classify};
use super::session::{PortResults, PortState, ScanSession};
use crate::network::channel::{CaptureHandle, ReadError};

/// Called with `(classified, requested)` whenever a port gets recorded.
pub type ProgressFn = Box<dyn FnMut(usize, usize) + Send>;

pub struct SynScanner {
    session: ScanSession,
    route: RouteInfo,
    next_hop_mac: MacAddr,
    template: SynTemplate,
    results: PortResults,
    on_progress: Option<ProgressFn>,
}

impl SynScanner {
    pub fn new(session: ScanSession, route: RouteInfo, next_hop_mac: MacAddr) -> Self {
        let template = SynTemplate {
            src_mac: session.interface().mac,
            dst_mac: next_hop_mac,
            src_addr: session.source(),
            dst_addr: session.target(),
            src_port: session.src_port(),
            sequence: session.sequence(),
        };
        Self {
            session,
            route,
            next_hop_mac,
            template,
            results: PortResults::default(),
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: Option<ProgressFn>) -> Self {
        self.on_progress = on_progress;
        self
    }

    pub fn run<C: CaptureHandle + ?Sized>(mut self, capture: &mut C) -> ScanReport {
        let target = self.session.target();
        info!("SYN scanning {target}");
        debug!(
            "Probing {} ports from {}:{}",
            self.session.ports().len(),
            self.session.source(),
            self.session.src_port()
        );

        let started = Instant::now();
        let mut last_send = started;
        let mut cursor = 0;

        let timed_out = loop {
            if self.results.len() == self.session.ports().len() {
                break false;
            }

            if let Some(&port) = self.session.ports().get(cursor) {
                self.send_probe(capture, port);
                last_send = Instant::now();
                cursor += 1;
            }

            let measured_from = match self.session.deadline() {
                DeadlinePolicy::SinceLastSend => last_send,
                DeadlinePolicy::Overall => started,
            };
            if measured_from.elapsed() > self.session.timeout() {
                info!("Scan of {target} timed out");
                break true;
            }

            let classification = match capture.read_frame() {
                Ok(frame) => classify(frame, &self.session, &self.results),
                Err(ReadError::Timeout) => continue,
                Err(ReadError::Io(e)) => {
                    warn!("{}", PacketIoError::Read(e));
                    continue;
                }
            };
            self.apply(classification);
        };

        self.into_report(timed_out, started.elapsed())
    }

    /// A probe that cannot be built or written is logged and not retried.
    fn send_probe<C: CaptureHandle + ?Sized>(&self, capture: &mut C, port: u16) {
        let sent = self
            .template
            .build(port)
            .map_err(|e| PacketIoError::Build(e.to_string()))
            .and_then(|frame| capture.write_frame(&frame).map_err(PacketIoError::Send));
        match sent {
            Ok(()) => trace!("SYN sent to port {port}"),
            Err(e) => warn!("Port {port}: {e}"),
        }
    }

    fn apply(&mut self, classification: Classification) {
        let Some((port, state)) = classification.port_state() else {
            trace!("Frame skipped: {classification:?}");
            return;
        };
        if !self.results.record(port, state) {
            return;
        }
        match state {
            PortState::Open => info!("port {port} open"),
            PortState::Closed => debug!("port {port} closed"),
        }
        if let Some(on_progress) = self.on_progress.as_mut() {
            on_progress(self.results.len(), self.session.ports().len());
        }
    }

    fn into_report(self, timed_out: bool, elapsed: Duration) -> ScanReport {
        ScanReport {
            target: self.session.target(),
            route: self.route,
            next_hop_mac: self.next_hop_mac,
            src_port: self.session.src_port(),
            requested: self.session.ports().to_vec(),
            results: self.results,
            timed_out,
            elapsed,
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
