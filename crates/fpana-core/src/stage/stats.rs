use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::aggregate::AggregatorStats;
use crate::error::{FpError, Result};
use crate::exposure::RunFieldDb;

/// File-level counters of one stage run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub files: u64,
    pub missing_files: u64,
    pub bad_files: u64,
    pub total_bytes: u64,
}

impl RunStats {
    pub fn log(&self, stage: &str) {
        info!(
            stage,
            files = self.files,
            missing = self.missing_files,
            bad = self.bad_files,
            size_kb = self.total_bytes / 1024,
            "Run statistics"
        );
    }
}

/// Write the run statistics text report: counters, optional aggregation
/// counters, then one `run field-min field-max` line per run.
pub fn write_stats_report(
    path: &Path,
    stats: &RunStats,
    runs: &RunFieldDb,
    aggregation: Option<&AggregatorStats>,
) -> Result<()> {
    let write = || -> std::io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(
            out,
            "## stats: files={} missing={} bad={} size={}",
            stats.files, stats.missing_files, stats.bad_files, stats.total_bytes
        )?;
        if let Some(agg) = aggregation {
            writeln!(
                out,
                "## measures: total={} bad={} in={} out={} objects={} err-radec={}",
                agg.measurements,
                agg.bad_measurements,
                agg.measurements_in_range,
                agg.out_of_range,
                agg.objects,
                agg.ra_dec_mismatches
            )?;
        }
        writeln!(out, "## run field-min field-max")?;
        for rf in runs.iter() {
            writeln!(out, "{:06} {:04} {:04}", rf.run, rf.field_min, rf.field_max)?;
        }
        out.flush()
    };
    write().map_err(|e| FpError::output(path, e))
}
