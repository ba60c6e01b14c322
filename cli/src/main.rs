mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, scan};
use scanr_common::error::ScanError;
use terminal::{logging, print};
use tracing::error;

/// Status for failures that are not a [`ScanError`].
const GENERIC_FAILURE: u8 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);
    print::header("starting scanner");

    match scan::scan(&commands).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn exit_code(e: &anyhow::Error) -> u8 {
    e.downcast_ref::<ScanError>()
        .map(ScanError::exit_code)
        .unwrap_or(GENERIC_FAILURE)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
