mod commands;
mod terminal;

use commands::{CommandLine, Commands, Config, ports, scan};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    if commands.no_color {
        colored::control::set_override(false);
    }
    logging::init_logging(commands.verbose, commands.quiet);

    let cfg = Config {
        quiet: commands.quiet,
        no_progress: commands.no_progress,
    };

    match commands.command {
        Commands::Scan(args) => {
            print::header("starting scanner", cfg.quiet);
            scan::scan(args, &cfg).await
        }
        Commands::Ports { specs } => {
            print::header("expanding ports", cfg.quiet);
            ports::ports(&specs, &cfg)
        }
    }
}
