use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{FpError, Result};

use super::grid::{FinalizedSource, SourceCatalog};

pub const SOURCE_LIST_HEADER: &str = "## id oid ra dec flx-mean-1 flx-sigma-1 nmes-1 flx-mean-2 ...";

/// Format one source as a text line (without newline):
/// `id oid ra dec` followed by `mean sigma n` per band.
pub fn format_source(source: &FinalizedSource) -> String {
    let mut line = format!(
        "{} {} {:.8} {:.8}",
        source.id, source.object_id, source.position.ra, source.position.dec
    );
    for band in &source.bands {
        line.push_str(&format!(" {:e} {:e} {}", band.mean, band.stddev, band.n));
    }
    line
}

/// Write the per-source text listing. Returns the number of lines written.
pub fn write_source_list(path: &Path, catalog: &SourceCatalog) -> Result<usize> {
    let write = || -> std::io::Result<usize> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "{}", SOURCE_LIST_HEADER)?;
        for source in &catalog.sources {
            writeln!(out, "{}", format_source(source))?;
        }
        out.flush()?;
        Ok(catalog.sources.len())
    };
    write().map_err(|e| FpError::output(path, e))
}
