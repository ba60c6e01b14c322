//! # Port Specification
//!
//! Parses the destination ports of a scan. Accepted formats:
//! * A single port (e.g., `80`).
//! * A comma-separated list (e.g., `22,80,443`).
//! * A hyphenated range (e.g., `1-1024`). The endpoints may be given in any order.

use std::collections::HashSet;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortSpecError {
    #[error("empty port specification")]
    Empty,
    #[error("invalid port: {0:?}")]
    InvalidPort(String),
    #[error("port 0 cannot be scanned")]
    ZeroPort,
    #[error("invalid port range: {0:?}")]
    InvalidRange(String),
}

/// Ordered list of distinct destination ports.
///
/// Duplicates are dropped at parse time, the first occurrence keeps its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    ports: Vec<u16>,
}

impl PortSpec {
    pub fn new<I: IntoIterator<Item = u16>>(ports: I) -> Self {
        let mut seen = HashSet::new();
        let ports = ports.into_iter().filter(|port| seen.insert(*port)).collect();
        Self { ports }
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.ports
    }

    pub fn into_vec(self) -> Vec<u16> {
        self.ports
    }
}

impl FromStr for PortSpec {
    type Err = PortSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortSpecError::Empty);
        }

        if s.contains(',') {
            let ports = s
                .split(',')
                .map(parse_port)
                .collect::<Result<Vec<u16>, _>>()?;
            return Ok(Self::new(ports));
        }

        if s.contains('-') {
            return parse_range(s).map(Self::new);
        }

        Ok(Self::new([parse_port(s)?]))
    }
}

fn parse_port(s: &str) -> Result<u16, PortSpecError> {
    let s = s.trim();
    let port: u16 = s
        .parse()
        .map_err(|_| PortSpecError::InvalidPort(s.to_string()))?;
    if port == 0 {
        return Err(PortSpecError::ZeroPort);
    }
    Ok(port)
}

fn parse_range(s: &str) -> Result<std::ops::RangeInclusive<u16>, PortSpecError> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| PortSpecError::InvalidRange(s.to_string()))?;
    if end.contains('-') {
        return Err(PortSpecError::InvalidRange(s.to_string()));
    }
    let (start, end) = (parse_port(start)?, parse_port(end)?);
    Ok(start.min(end)..=start.max(end))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
