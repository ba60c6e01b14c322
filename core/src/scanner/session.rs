use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use scanr_common::config::{DeadlinePolicy, ScanConfig};
use scanr_common::network::interface::LinkInterface;

/// IANA dynamic/private port range the probe source port is drawn from.
pub const EPHEMERAL_PORTS: RangeInclusive<u16> = 49_152..=65_535;

/// Fixed parameters of one SYN scan.
#[derive(Debug, Clone)]
pub struct ScanSession {
    interface: LinkInterface,
    source: Ipv4Addr,
    target: Ipv4Addr,
    src_port: u16,
    sequence: u32,
    timeout: Duration,
    deadline: DeadlinePolicy,
    ports: Vec<u16>,
    requested: HashSet<u16>,
}

impl ScanSession {
    /// Repeated ports are kept once, at their first position.
    pub fn new<R: Rng>(
        interface: LinkInterface,
        source: Ipv4Addr,
        target: Ipv4Addr,
        ports: Vec<u16>,
        cfg: &ScanConfig,
        rng: &mut R,
    ) -> Self {
        let mut requested = HashSet::with_capacity(ports.len());
        let ports: Vec<u16> = ports.into_iter().filter(|port| requested.insert(*port)).collect();
        Self {
            interface,
            source,
            target,
            src_port: rng.random_range(EPHEMERAL_PORTS),
            sequence: rng.random(),
            timeout: cfg.timeout,
            deadline: cfg.deadline,
            ports,
            requested,
        }
    }

    pub fn interface(&self) -> &LinkInterface {
        &self.interface
    }

    /// Local address probes are sent from.
    pub fn source(&self) -> Ipv4Addr {
        self.source
    }

    pub fn target(&self) -> Ipv4Addr {
        self.target
    }

    pub fn src_port(&self) -> u16 {
        self.src_port
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn deadline(&self) -> DeadlinePolicy {
        self.deadline
    }

    /// Destination ports in send order.
    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    pub fn is_requested(&self, port: u16) -> bool {
        self.requested.contains(&port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortState {
    Open,
    Closed,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortState::Open => f.write_str("open"),
            PortState::Closed => f.write_str("closed"),
        }
    }
}

/// Classified ports of one scan. A port's first classification is final.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortResults {
    states: BTreeMap<u16, PortState>,
}

impl PortResults {
    /// Returns `false` and leaves the map untouched if `port` was already recorded.
    pub fn record(&mut self, port: u16, state: PortState) -> bool {
        if self.states.contains_key(&port) {
            return false;
        }
        self.states.insert(port, state);
        true
    }

    pub fn get(&self, port: u16) -> Option<PortState> {
        self.states.get(&port).copied()
    }

    pub fn contains(&self, port: u16) -> bool {
        self.states.contains_key(&port)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Ports in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, PortState)> + '_ {
        self.states.iter().map(|(port, state)| (*port, *state))
    }

    pub fn with_state(&self, state: PortState) -> Vec<u16> {
        self.iter().filter(|(_, s)| *s == state).map(|(port, _)| port).collect()
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
