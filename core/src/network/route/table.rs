//! Table-scan route lookup over the kernel routing table as exported in
//! `/proc/net/route`.

use std::net::Ipv4Addr;

use anyhow::{Context, bail};

const RTF_UP: u16 = 0x0001;
const RTF_GATEWAY: u16 = 0x0002;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub iface: String,
    pub destination: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub flags: u16,
    pub metric: u32,
    pub mask: Ipv4Addr,
}

impl RouteEntry {
    pub fn prefix_len(&self) -> u32 {
        u32::from(self.mask).count_ones()
    }

    pub fn matches(&self, target: Ipv4Addr) -> bool {
        let mask = u32::from(self.mask);
        u32::from(target) & mask == u32::from(self.destination) & mask
    }

    /// `None` for routes to directly attached networks.
    pub fn next_hop_gateway(&self) -> Option<Ipv4Addr> {
        (self.flags & RTF_GATEWAY != 0 && !self.gateway.is_unspecified()).then_some(self.gateway)
    }

    fn is_up(&self) -> bool {
        self.flags & RTF_UP != 0
    }
}

/// Parses the text of `/proc/net/route`. The header line is skipped.
pub fn parse_table(text: &str) -> anyhow::Result<Vec<RouteEntry>> {
    text.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(idx, line)| {
            parse_line(line).with_context(|| format!("route table line {}", idx + 2))
        })
        .collect()
}

fn parse_line(line: &str) -> anyhow::Result<RouteEntry> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 8 {
        bail!("expected at least 8 fields, found {}", fields.len());
    }
    Ok(RouteEntry {
        iface: fields[0].to_string(),
        destination: parse_hex_addr(fields[1])?,
        gateway: parse_hex_addr(fields[2])?,
        flags: u16::from_str_radix(fields[3], 16)
            .with_context(|| format!("flags {:?}", fields[3]))?,
        metric: fields[6].parse().with_context(|| format!("metric {:?}", fields[6]))?,
        mask: parse_hex_addr(fields[7])?,
    })
}

/// The kernel prints each address as a native-endian `u32` in hex.
fn parse_hex_addr(field: &str) -> anyhow::Result<Ipv4Addr> {
    let raw = u32::from_str_radix(field, 16).with_context(|| format!("address {field:?}"))?;
    Ok(Ipv4Addr::from(raw.to_ne_bytes()))
}

/// Longest-prefix match among the routes that are up.
///
/// Equal prefixes are broken by the lower metric, then by table order.
pub fn select_route(entries: &[RouteEntry], target: Ipv4Addr) -> Option<&RouteEntry> {
    let mut best: Option<&RouteEntry> = None;
    for entry in entries.iter().filter(|e| e.is_up() && e.matches(target)) {
        best = match best {
            Some(current)
                if (current.prefix_len(), std::cmp::Reverse(current.metric))
                    >= (entry.prefix_len(), std::cmp::Reverse(entry.metric)) =>
            {
                Some(current)
            }
            _ => Some(entry),
        };
    }
    best
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
