use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use fpana_core::collect::{merge_catalogs, CatalogKind};
use tracing::info;

#[derive(Clone, Copy, ValueEnum)]
pub enum CatalogKindArg {
    /// id + coord[2] columns
    Lsst,
    /// id, ra, dec columns
    Sdss,
}

impl From<CatalogKindArg> for CatalogKind {
    fn from(kind: CatalogKindArg) -> Self {
        match kind {
            CatalogKindArg::Lsst => CatalogKind::Lsst,
            CatalogKindArg::Sdss => CatalogKind::Sdss,
        }
    }
}

#[derive(Args)]
pub struct MergeArgs {
    /// Input catalog files
    pub files: Vec<PathBuf>,

    /// Catalog layout of the inputs
    #[arg(long, value_enum, default_value = "lsst")]
    pub kind: CatalogKindArg,

    /// Output file path
    #[arg(short, long, default_value = "astro.fits")]
    pub output: PathBuf,
}

pub fn run(args: &MergeArgs) -> Result<()> {
    if args.files.is_empty() {
        bail!("No input catalogs given");
    }
    let kind = CatalogKind::from(args.kind);
    info!(inputs = args.files.len(), %kind, "Merging catalogs");

    let summary = merge_catalogs(args.files.as_slice(), kind, &args.output)
        .with_context(|| format!("Failed to merge into {}", args.output.display()))?;

    println!(
        "Merged {} rows from {} file(s) into {}",
        summary.records,
        summary.workers,
        args.output.display()
    );
    Ok(())
}
