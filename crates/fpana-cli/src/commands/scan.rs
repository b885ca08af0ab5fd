use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fpana_core::consts::{STATS_FILE, SUMMARY_TABLE_FILE};
use fpana_core::jobs::ExposureScanner;

#[derive(Args)]
pub struct ScanArgs {
    /// Job config file (TOML)
    #[arg(short, long, default_value = "jobo.toml")]
    pub config: PathBuf,
}

pub fn run(args: &ScanArgs) -> Result<()> {
    let config = super::run_stage(&args.config, "fp-scan", ExposureScanner::new())?;

    println!("\nSummary saved to {}", config.out_dir.join(SUMMARY_TABLE_FILE).display());
    println!("Stats saved to {}", config.out_dir.join(STATS_FILE).display());
    Ok(())
}
