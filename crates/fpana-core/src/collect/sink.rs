use std::path::Path;

use crate::error::Result;
use crate::io::{FitsTableWriter, ToRow};

use super::pipeline::RecordSink;

/// Extension name of merged catalog tables.
pub const MERGED_EXTNAME: &str = "astro";

/// Appends collected records to a FITS binary table.
pub struct FitsRecordSink {
    writer: FitsTableWriter,
}

impl FitsRecordSink {
    /// Create the output table with `R`'s column layout.
    pub fn create<R: ToRow>(path: &Path) -> Result<Self> {
        Ok(Self {
            writer: FitsTableWriter::create_for::<R>(path, MERGED_EXTNAME)?,
        })
    }

    pub fn rows_written(&self) -> usize {
        self.writer.rows_written()
    }

    /// Flush the table and patch its row count.
    pub fn finish(self) -> Result<()> {
        self.writer.finish()
    }
}

impl<R: ToRow> RecordSink<R> for FitsRecordSink {
    fn write_record(&mut self, record: &R) -> Result<()> {
        self.writer.write_record(record)
    }
}
