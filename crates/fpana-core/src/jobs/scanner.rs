use std::fmt;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::catalog::{ExposureSummary, ForcedSource};
use crate::config::FluxWindow;
use crate::consts::{SCAN_BATCH_ROWS, STATS_FILE, SUMMARY_TABLE_FILE};
use crate::error::{FpError, Result};
use crate::exposure::ExposureFile;
use crate::io::{FitsTableReader, FitsTableWriter};
use crate::stage::{write_stats_report, FileHandler, StageContext};

/// Extension name of the exposure summary table.
pub const SUMMARY_EXTNAME: &str = "fpfsum";

/// Summarizes every exposure file into one row of `fpfsum.fits` and writes
/// the run/field statistics report on stop.
#[derive(Default)]
pub struct ExposureScanner {
    writer: Option<FitsTableWriter>,
    exposures: usize,
}

impl ExposureScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of summary rows written so far.
    pub fn exposures(&self) -> usize {
        self.exposures
    }
}

/// Fold a file's measurements into a summary row. Positions are converted
/// to degrees; only fluxes strictly inside `window` count toward the mean.
fn summarize(
    summary: &mut ExposureSummary,
    rows: &[ForcedSource],
    window: &FluxWindow,
    flux_sum: &mut f64,
) {
    for m in rows {
        let pos = m.position();
        summary.ra_mnx = [summary.ra_mnx[0].min(pos.ra), summary.ra_mnx[1].max(pos.ra)];
        summary.dec_mnx = [summary.dec_mnx[0].min(pos.dec), summary.dec_mnx[1].max(pos.dec)];
        summary.id_mnx = [summary.id_mnx[0].min(m.id), summary.id_mnx[1].max(m.id)];
        summary.oid_mnx = [
            summary.oid_mnx[0].min(m.object_id),
            summary.oid_mnx[1].max(m.object_id),
        ];
        summary.flux_mnx = [summary.flux_mnx[0].min(m.flux), summary.flux_mnx[1].max(m.flux)];
        if window.contains_exclusive(m.flux) {
            summary.nflux_ok += 1;
            *flux_sum += m.flux;
        }
    }
}

/// Narrow a value into an `int32` summary column.
fn int32_cell<T>(value: T, column: &str, table: &Path) -> Result<i32>
where
    T: Copy + TryInto<i32> + fmt::Display,
{
    value.try_into().map_err(|_| {
        FpError::output(
            table,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{column} = {value} does not fit an int32 column"),
            ),
        )
    })
}

impl FileHandler for ExposureScanner {
    fn start(&mut self, ctx: &StageContext) -> Result<()> {
        let path = ctx.out_path(SUMMARY_TABLE_FILE);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| FpError::output(&path, e))?;
        }
        self.writer = Some(FitsTableWriter::create_for::<ExposureSummary>(
            &path,
            SUMMARY_EXTNAME,
        )?);
        Ok(())
    }

    fn process_file(&mut self, ctx: &StageContext, file: &ExposureFile) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| FpError::Pipeline("summary table is not open".into()))?;

        let table = ctx.out_path(SUMMARY_TABLE_FILE);
        let mut reader = FitsTableReader::open(&file.path)?;
        let total = reader.row_count();
        let mut summary = ExposureSummary::new(
            int32_cell(file.run, "run", &table)?,
            int32_cell(file.field, "field", &table)?,
            file.camcol_filter(),
        );
        summary.nsrc = int32_cell(total, "nsrc", &table)?;

        let mut flux_sum = 0.0;
        let mut offset = 0;
        while offset < total {
            let batch = reader.decode_rows::<ForcedSource>(offset, SCAN_BATCH_ROWS)?;
            summarize(&mut summary, &batch, &ctx.flux, &mut flux_sum);
            offset += SCAN_BATCH_ROWS;
        }
        if summary.nflux_ok > 0 {
            summary.flux_mean = flux_sum / summary.nflux_ok as f64;
        }

        debug!(
            path = %file.path.display(),
            nsrc = summary.nsrc,
            nflux_ok = summary.nflux_ok,
            "Exposure summarized"
        );
        writer.write_record(&summary)?;
        self.exposures += 1;
        Ok(())
    }

    fn stop(&mut self, ctx: &StageContext) -> Result<()> {
        write_stats_report(&ctx.out_path(STATS_FILE), &ctx.stats, &ctx.run_fields, None)?;
        if let Some(writer) = self.writer.take() {
            writer.finish()?;
        }
        Ok(())
    }
}
