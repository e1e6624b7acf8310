//! recon CLI
//!
//! Command-line interface for reconciling JSON documents

use clap::{Parser, Subcommand, ValueEnum};
use recon_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "recon")]
#[command(about = "recon - Compare JSON documents after normalization", long_about = None)]
struct Cli {
    /// Emit logs to stderr in the given format (silent when omitted)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report the differences between two JSON files
    Diff(commands::diff::DiffArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.log_format {
        Some(LogFormat::Human) => logging_facility::init(Profile::Development),
        Some(LogFormat::Json) => logging_facility::init(Profile::Production),
        None => {}
    }

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
