use anyhow::Context;
use colored::*;
use is_root::is_root;
use rand::SeedableRng;
use rand::rngs::StdRng;
use scanr_common::network::interface::LinkInterface;
use scanr_common::network::mac;
use scanr_core::scanner::{self, ScanReport};
use tracing::warn;

use crate::commands::CommandLine;
use crate::terminal::{colors, format, print, spinner};

pub async fn scan(args: &CommandLine) -> anyhow::Result<()> {
    let interface = LinkInterface::by_name(&args.interface)?;
    if !is_root() {
        warn!("Not running as root, opening a capture on {} will likely fail", interface.name);
    }

    let cfg = args.scan_config();
    let target = args.target;
    let ports = args.ports.as_slice().to_vec();

    let spinner = spinner::start(&format!("Scanning {} ports of {target}...", ports.len()));
    let on_progress = spinner.progress();
    let report: ScanReport = tokio::task::spawn_blocking(move || {
        let mut rng = StdRng::from_os_rng();
        scanner::run_syn_scan(&interface, target, ports, &cfg, &mut rng, Some(on_progress))
    })
    .await
    .context("scan task did not complete")??;
    drop(spinner);

    print_report(&report);
    Ok(())
}

fn print_report(report: &ScanReport) {
    print::header("scan report");
    print::aligned_line("Target", report.target.to_string().color(colors::IPV4_ADDR));
    print::aligned_line("Route", report.route);
    let vendor = mac::get_vendor(report.next_hop_mac);
    let next_hop = format::mac_with_vendor(report.next_hop_mac, vendor.as_deref());
    print::aligned_line("Next hop", next_hop);
    print::aligned_line("Source port", report.src_port);

    if report.results.is_empty() {
        print::print_status("No port answered".color(colors::PORT_FILTERED).to_string());
    } else {
        print::print_status("Ports");
        print::as_tree_one_level(&format::port_rows(report));
    }

    print::fat_separator();
    print::centerln(&summary(report));
}

fn summary(report: &ScanReport) -> String {
    let open: ColoredString = format!("{} open", report.open().len())
        .color(colors::PORT_OPEN)
        .bold();
    let elapsed: ColoredString = format!("{:.2}s", report.elapsed.as_secs_f64()).bold().yellow();
    let ending = if report.timed_out { " (timed out)" } else { "" };
    format!(
        "Scan complete: {open} of {} ports in {elapsed}{ending}",
        report.requested.len()
    )
}
