//! localedata CLI - resolve locale data from the command line
//!
//! ```text
//! localedata resolve sysres --package my-app --base-path ./locale --locale de-DE
//! localedata roots --config localedata.ini
//! localedata preload de-DE --package my-app --base-path ./locale
//! ```

mod commands;
mod config;
mod error;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::common::EngineArgs;
use commands::preload::PreloadArgs;
use commands::resolve::ResolveArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "localedata")]
#[command(version = localedata::VERSION)]
#[command(about = "Resolve and merge locale data fragments", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load a basename for a locale and print the merged JSON
    Resolve(ResolveArgs),

    /// Print the roots searched, highest priority first
    Roots(EngineArgs),

    /// Load whole-locale files into the cache and report
    Preload(PreloadArgs),
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Resolve(args) => commands::resolve::run(args),
        Commands::Roots(args) => commands::roots::run(args),
        Commands::Preload(args) => commands::preload::run(args),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
