use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fpana_core::consts::{SOURCE_LIST_FILE, SOURCE_LIST_STATS_FILE};
use fpana_core::jobs::SourceListBuilder;

#[derive(Args)]
pub struct ListArgs {
    /// Job config file (TOML)
    #[arg(short, long, default_value = "jobo.toml")]
    pub config: PathBuf,
}

pub fn run(args: &ListArgs) -> Result<()> {
    let config = super::run_stage(&args.config, "fp-list", SourceListBuilder::new())?;

    println!("\nSource list saved to {}", config.out_dir.join(SOURCE_LIST_FILE).display());
    println!(
        "Stats saved to {}",
        config.out_dir.join(SOURCE_LIST_STATS_FILE).display()
    );
    Ok(())
}
