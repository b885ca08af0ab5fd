mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fpana", about = "Forced-photometry batch analysis")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize every exposure of a job into fpfsum.fits
    Scan(commands::scan::ScanArgs),
    /// Aggregate a job's measurements into a per-object source list
    List(commands::list::ListArgs),
    /// Merge catalog tables into one position table
    Merge(commands::merge::MergeArgs),
    /// Print or save a default job config
    Config(commands::config::ConfigArgs),
    /// Show binary table metadata
    Info(commands::info::InfoArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn,fpana_core=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Scan(args) => commands::scan::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::Merge(args) => commands::merge::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
