pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::status::StatusOptions;

#[derive(Debug, Parser)]
#[command(
    name = "bluelight",
    about = "Bluelight deploy status CLI",
    long_about = "Check deployment status across the overall pipeline and the AU, CA, OR and US regions.",
    after_help = "Examples:\n  bluelight status\n  bluelight status --watch --interval 30\n  bluelight status --json\n  bluelight config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Fetch every region's deploy status and print it")]
    Status {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
        #[arg(long, conflicts_with = "json", help = "Continuously refresh status until Ctrl+C")]
        watch: bool,
        #[arg(
            long,
            default_value_t = 60,
            value_parser = clap::value_parser!(u64).range(1..),
            help = "Seconds between refreshes in watch mode"
        )]
        interval: u64,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Status { json, watch, interval } => {
            commands::status::run(StatusOptions { json, watch, interval_secs: interval })
        }
        Command::Config => commands::config::run(),
    };

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}
