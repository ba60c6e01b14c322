use colored::*;
use pnet::util::MacAddr;
use scanr_core::scanner::{PortState, ScanReport};

use crate::terminal::colors;

/// Ports listed individually before they are collapsed into a count.
const MAX_LISTED: usize = 16;

pub fn mac_with_vendor(mac: MacAddr, vendor: Option<&str>) -> ColoredString {
    let mac: ColoredString = mac.to_string().color(colors::MAC_ADDR);
    match vendor {
        Some(vendor) => {
            let vendor: ColoredString = format!("({vendor})").color(colors::SEPARATOR);
            format!("{mac} {vendor}").normal()
        }
        None => mac,
    }
}

pub fn port_state(state: PortState) -> ColoredString {
    match state {
        PortState::Open => "open".color(colors::PORT_OPEN).bold(),
        PortState::Closed => "closed".color(colors::PORT_CLOSED),
    }
}

/// Tree rows of a report: every open port, then closed and silent ports.
///
/// Closed and silent ports are only listed one by one when there are few of them.
pub fn port_rows(report: &ScanReport) -> Vec<(String, ColoredString)> {
    let mut rows: Vec<(String, ColoredString)> = report
        .open()
        .into_iter()
        .map(|port| (format!("{port}/tcp"), port_state(PortState::Open)))
        .collect();

    let closed = report.closed();
    if closed.len() <= MAX_LISTED {
        rows.extend(
            closed
                .into_iter()
                .map(|port| (format!("{port}/tcp"), port_state(PortState::Closed))),
        );
    } else {
        rows.push((
            "closed".to_string(),
            format!("{} ports", closed.len()).color(colors::PORT_CLOSED),
        ));
    }

    let filtered = report.filtered();
    if filtered.len() <= MAX_LISTED {
        rows.extend(
            filtered
                .into_iter()
                .map(|port| (format!("{port}/tcp"), "filtered".color(colors::PORT_FILTERED))),
        );
    } else {
        rows.push((
            "filtered".to_string(),
            format!("{} ports", filtered.len()).color(colors::PORT_FILTERED),
        ));
    }
    rows
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
