//! Failure taxonomy of a scan.
//!
//! [`ScanError`] covers everything that aborts a scan before or while it is
//! being set up. [`PacketIoError`] covers single frames that could not be
//! written or read once the scan loop runs; those are logged and skipped.

use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no route to {target}: {reason}")]
    RouteUnavailable { target: Ipv4Addr, reason: String },

    #[error("failed to open capture on {interface}: {source}")]
    CaptureOpenFailure {
        interface: String,
        #[source]
        source: io::Error,
    },

    #[error("capture on {0} is not an ethernet channel")]
    UnsupportedChannel(String),

    #[error("no ARP reply from {target} within {waited:?}")]
    ResolutionTimeout { target: Ipv4Addr, waited: Duration },

    #[error("ARP request to {target} could not be sent: {source}")]
    ResolutionSendFailure {
        target: Ipv4Addr,
        #[source]
        source: PacketIoError,
    },

    #[error("interface {0} does not exist")]
    InterfaceNotFound(String),

    #[error("interface {0} has no hardware address")]
    InterfaceWithoutMac(String),
}

impl ScanError {
    /// Process exit status for this error.
    ///
    /// `1` is left to usage errors reported by the command line parser.
    pub fn exit_code(&self) -> u8 {
        match self {
            ScanError::RouteUnavailable { .. } => 2,
            ScanError::CaptureOpenFailure { .. } | ScanError::UnsupportedChannel(_) => 3,
            ScanError::ResolutionTimeout { .. } | ScanError::ResolutionSendFailure { .. } => 4,
            ScanError::InterfaceNotFound(_) | ScanError::InterfaceWithoutMac(_) => 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum PacketIoError {
    #[error("could not build frame: {0}")]
    Build(String),

    #[error("could not write frame: {0}")]
    Send(#[source] io::Error),

    #[error("could not read frame: {0}")]
    Read(#[source] io::Error),
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
