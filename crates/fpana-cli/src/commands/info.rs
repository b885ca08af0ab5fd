use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fpana_core::io::FitsTableReader;

#[derive(Args)]
pub struct InfoArgs {
    /// Input FITS table
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let reader = FitsTableReader::open(&args.file)?;
    let schema = reader.schema();

    println!("File:        {}", reader.path().display());
    println!("Table:       {}", reader.extname().unwrap_or("(unnamed)"));
    println!("Rows:        {}", reader.row_count());
    println!("Columns:     {}", schema.columns().len());
    for col in schema.columns() {
        println!("  {:<16}{:>6}", col.name, col.tform());
    }

    let total_mb = std::fs::metadata(&args.file)?.len() as f64 / (1024.0 * 1024.0);
    println!("File size:   {:.1} MB", total_mb);

    Ok(())
}
