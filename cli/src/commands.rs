pub mod ports;
pub mod scan;

use clap::{ArgAction, Args, Parser, Subcommand};
use portsweep_common::config::{DEFAULT_MAX_WORKERS, DEFAULT_TIMEOUT_MS};
use portsweep_common::network::target::Target;

/// Presentation settings shared by every subcommand.
pub struct Config {
    /// `0` prints everything, `1` drops headers and progress, `2` prints open ports only.
    pub quiet: u8,
    pub no_progress: bool,
}

#[derive(Parser)]
#[command(name = "portsweep", version)]
#[command(about = "A concurrent TCP connect scanner.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Reduce output (-q hides headers and progress, -qq prints open ports only)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Hide the progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan one or more hosts for open TCP ports
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// Show which ports a specification expands to, without scanning
    #[command(alias = "p")]
    Ports {
        #[arg(required = true)]
        specs: Vec<String>,
    },
}

#[derive(Args)]
pub struct ScanArgs {
    /// IPv4/IPv6 addresses or hostnames, comma-separated lists allowed
    #[arg(required = true)]
    pub targets: Vec<Target>,

    /// Ports to probe: 22, 8000-8100, common, all (repeatable, comma-separated)
    #[arg(short, long = "ports", default_value = "common")]
    pub ports: Vec<String>,

    /// Handshake timeout per probe, in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,

    /// Maximum number of concurrent probes (capped at 128 and the CPU count)
    #[arg(short, long, default_value_t = DEFAULT_MAX_WORKERS)]
    pub jobs: usize,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        CommandLine::command().debug_assert();
    }

    #[test]
    fn scan_defaults_to_common_ports() {
        let cli = CommandLine::try_parse_from(["portsweep", "scan", "127.0.0.1"]).unwrap();
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan subcommand");
        };
        assert_eq!(args.ports, vec!["common".to_string()]);
        assert_eq!(args.timeout, DEFAULT_TIMEOUT_MS);
        assert_eq!(args.jobs, DEFAULT_MAX_WORKERS);
    }

    #[test]
    fn scan_accepts_repeated_ports_and_global_flags() {
        let cli = CommandLine::try_parse_from([
            "portsweep", "s", "::1,localhost", "-p", "22,80", "-p", "8000-8010", "-t", "250",
            "-j", "16", "-qq",
        ])
        .unwrap();

        assert_eq!(cli.quiet, 2);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan subcommand");
        };
        assert_eq!(args.targets.len(), 1);
        assert_eq!(args.ports, vec!["22,80".to_string(), "8000-8010".to_string()]);
        assert_eq!(args.timeout, 250);
        assert_eq!(args.jobs, 16);
    }

    #[test]
    fn invalid_target_is_rejected_at_parse_time() {
        assert!(CommandLine::try_parse_from(["portsweep", "scan", "not a host"]).is_err());
    }
}
