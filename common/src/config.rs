use std::time::Duration;

/// Scan-level timeout used when the operator does not pass `--timeout`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Upper bound for waiting on the ARP reply of the next hop.
pub const ARP_TIMEOUT: Duration = Duration::from_secs(3);
/// How long a single read on the capture handle may block.
pub const READ_TIMEOUT: Duration = Duration::from_millis(50);
pub const SNAPSHOT_LEN: usize = 65_536;

/// Where the scan-level timeout is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadlinePolicy {
    /// Restarted on every SYN sent. A long port list never times out while
    /// sends are still going out, and the scan ends `timeout` after the last one.
    #[default]
    SinceLastSend,
    /// Measured once from the start of the scan.
    Overall,
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub timeout: Duration,
    pub deadline: DeadlinePolicy,
    pub arp_timeout: Duration,
    /// Forwarded to the capture handle as its per-read timeout.
    ///
    /// Keeps the scan loop responsive to `timeout` while no frames arrive.
    pub read_timeout: Duration,
    pub snapshot_len: usize,
    pub promiscuous: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            deadline: DeadlinePolicy::default(),
            arp_timeout: ARP_TIMEOUT,
            read_timeout: READ_TIMEOUT,
            snapshot_len: SNAPSHOT_LEN,
            promiscuous: true,
        }
    }
}

impl ScanConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: DeadlinePolicy) -> Self {
        self.deadline = deadline;
        self
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
