use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use portsweep_common::{config::ScanConfig, network::target, ports::PortSet};
use portsweep_core::{ProgressCallback, ScanReport, perform_scan};

use crate::commands::{Config, ScanArgs};
use crate::terminal::{colors, format, print, progress};

pub async fn scan(args: ScanArgs, cfg: &Config) -> anyhow::Result<()> {
    let ports: PortSet = PortSet::parse(&args.ports).context("invalid port specification")?;
    let addresses = target::to_addresses(&args.targets).await;

    let scan_cfg = ScanConfig {
        timeout_ms: args.timeout,
        max_workers: args.jobs,
    };
    let host_count: usize = addresses.len();
    let total: usize = host_count.saturating_mul(ports.len());

    let bar = progress::start(total as u64, cfg.quiet > 0 || cfg.no_progress);
    let on_probe_done: ProgressCallback = Box::new(move |_| bar.inc(1));

    let start_time: Instant = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || {
        perform_scan(&addresses, &ports, &scan_cfg, Some(on_probe_done))
    })
    .await;
    progress::finish();

    let report: ScanReport = outcome.context("scan worker stopped unexpectedly")??;
    scan_ends(&report, host_count, start_time.elapsed(), cfg);
    Ok(())
}

fn scan_ends(report: &ScanReport, host_count: usize, total_time: Duration, cfg: &Config) {
    if report.is_empty() {
        print::header("zero open ports", cfg.quiet);
        print::no_results(cfg.quiet);
    } else {
        print::header("open ports", cfg.quiet);
        for result in &report.results {
            print::print(&format::open_port_line(result));
        }
    }

    if report.dropped > 0 && cfg.quiet < 2 {
        print::print_status(format!(
            "{} open ports were found but could not be recorded",
            report.dropped.to_string().red().bold()
        ));
    }

    print_summary(report, host_count, total_time, cfg);
}

fn print_summary(report: &ScanReport, host_count: usize, total_time: Duration, cfg: &Config) {
    let open: ColoredString = format!("{} open", report.results.len()).bold().green();
    let probed: ColoredString = format!("{} probes", report.probed).bold();
    let hosts: ColoredString = format!("{host_count} hosts").bold();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Scan Complete: {open} of {probed} on {hosts} in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        1 => print::print(&output),
        _ => {}
    }
}
