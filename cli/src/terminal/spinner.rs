use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use scanr_core::scanner::ProgressFn;

use crate::terminal::colors;

static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

const TICKS: &[&str] = &[
    "▁▁▁▁▁", "▁▂▂▂▁", "▁▄▂▄▁", "▂▄▆▄▂", "▄▆█▆▄", "▂▄▆▄▂", "▁▄▂▄▁", "▁▂▂▂▁",
];

/// Spinner shown while a scan runs. Cleared when dropped.
pub struct ScanSpinner {
    pb: ProgressBar,
}

pub fn start(message: &str) -> ScanSpinner {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_strings(TICKS));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());

    if let Ok(mut active) = ACTIVE.lock() {
        *active = Some(pb.clone());
    }
    ScanSpinner { pb }
}

impl ScanSpinner {
    /// Observer for the scan engine that keeps the spinner message current.
    pub fn progress(&self) -> ProgressFn {
        let pb = self.pb.clone();
        Box::new(move |classified, requested| {
            pb.set_message(progress_message(classified, requested))
        })
    }
}

impl Drop for ScanSpinner {
    fn drop(&mut self) {
        if let Ok(mut active) = ACTIVE.lock() {
            *active = None;
        }
        self.pb.finish_and_clear();
    }
}

fn progress_message(classified: usize, requested: usize) -> String {
    format!(
        "Classified {} of {requested} ports...",
        classified.to_string().green().bold()
    )
    .color(colors::TEXT_DEFAULT)
    .to_string()
}

/// Log sink that prints above the spinner while one is active.
pub struct SpinnerWriter;

impl io::Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let active = ACTIVE.lock().ok().and_then(|active| active.clone());
        match active {
            Some(pb) if !pb.is_hidden() => {
                let msg = String::from_utf8_lossy(buf);
                pb.println(msg.trim_end());
            }
            _ => io::stdout().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
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
