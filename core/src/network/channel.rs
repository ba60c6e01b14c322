//! Link-layer capture handle.
//!
//! The scanner only ever talks to the wire through [`CaptureHandle`], which
//! lets the resolver and the scan loop run against scripted frames in tests.

use std::io;

use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use scanr_common::config::ScanConfig;
use scanr_common::error::ScanError;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReadError {
    /// Nothing arrived within the handle's per-read timeout.
    #[error("read timed out")]
    Timeout,
    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for ReadError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ReadError::Timeout,
            _ => ReadError::Io(e),
        }
    }
}

pub trait CaptureHandle {
    /// Blocks for at most the handle's read timeout.
    fn read_frame(&mut self) -> Result<&[u8], ReadError>;

    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()>;
}

impl<C: CaptureHandle + ?Sized> CaptureHandle for &mut C {
    fn read_frame(&mut self) -> Result<&[u8], ReadError> {
        (**self).read_frame()
    }

    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        (**self).write_frame(frame)
    }
}

/// Ethernet channel on one interface. The channel is closed when this is dropped.
pub struct EthernetCapture {
    interface: String,
    tx: Box<dyn DataLinkSender>,
    rx: Box<dyn DataLinkReceiver>,
}

impl EthernetCapture {
    pub fn open(intf: &NetworkInterface, cfg: &ScanConfig) -> Result<Self, ScanError> {
        Self::open_with(intf, cfg, datalink::channel)
    }

    pub fn open_with<F>(
        intf: &NetworkInterface,
        cfg: &ScanConfig,
        channel_opener: F,
    ) -> Result<Self, ScanError>
    where
        F: FnOnce(&NetworkInterface, Config) -> io::Result<Channel>,
    {
        let ch: Channel =
            channel_opener(intf, get_config(cfg)).map_err(|source| ScanError::CaptureOpenFailure {
                interface: intf.name.clone(),
                source,
            })?;
        match ch {
            Channel::Ethernet(tx, rx) => {
                debug!("Capture opened on {}", intf.name);
                Ok(Self {
                    interface: intf.name.clone(),
                    tx,
                    rx,
                })
            }
            _ => Err(ScanError::UnsupportedChannel(intf.name.clone())),
        }
    }
}

impl CaptureHandle for EthernetCapture {
    fn read_frame(&mut self) -> Result<&[u8], ReadError> {
        self.rx.next().map_err(ReadError::from)
    }

    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        match self.tx.send_to(frame, None) {
            Some(result) => result,
            None => Err(io::Error::other("datalink sender did not report a send result")),
        }
    }
}

impl Drop for EthernetCapture {
    fn drop(&mut self) {
        debug!("Capture on {} released", self.interface);
    }
}

fn get_config(cfg: &ScanConfig) -> Config {
    Config {
        read_timeout: Some(cfg.read_timeout),
        read_buffer_size: cfg.snapshot_len,
        promiscuous: cfg.promiscuous,
        ..Default::default()
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
