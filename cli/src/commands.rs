pub mod scan;

use std::net::Ipv4Addr;
use std::time::Duration;

use clap::{ArgAction, Parser};
use scanr_common::config::{DEFAULT_TIMEOUT, DeadlinePolicy, ScanConfig};
use scanr_common::ports::PortSpec;

#[derive(Parser, Debug)]
#[command(name = "scanr", version)]
#[command(about = "A link-layer TCP SYN port scanner.")]
pub struct CommandLine {
    /// Interface to send probes and capture replies on
    #[arg(short = 'i', long = "interface", value_name = "NAME")]
    pub interface: String,

    /// IPv4 address of the host to scan
    #[arg(short = 't', long = "target", value_name = "IPV4")]
    pub target: Ipv4Addr,

    /// Ports to probe: `80`, `22,80,443` or `1-1024`
    #[arg(short = 'p', long = "ports", value_name = "PORTS")]
    pub ports: PortSpec,

    /// Seconds to wait for replies after the last probe
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Measure the timeout from the start of the scan instead
    #[arg(long)]
    pub overall_deadline: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl CommandLine {
    /// Parses the process arguments.
    ///
    /// Help and version go to stdout with status 0. Every other parse failure,
    /// including a missing flag, prints usage and exits with status 1.
    pub fn parse_args() -> Self {
        match Self::try_parse() {
            Ok(cmd) => cmd,
            Err(e) if !e.use_stderr() => e.exit(),
            Err(e) => {
                let _ = e.print();
                std::process::exit(1);
            }
        }
    }

    pub fn scan_config(&self) -> ScanConfig {
        let deadline = if self.overall_deadline {
            DeadlinePolicy::Overall
        } else {
            DeadlinePolicy::SinceLastSend
        };
        ScanConfig::default()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_deadline(deadline)
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
