use std::fs::File;
use std::path::{Path, PathBuf};

use fitsio::FitsFile;

use crate::error::{FpError, Result};
use crate::io::table::{ColumnData, ColumnSpec, RowEncoder, TableSchema, ToRow};

/// Builds a FITS file holding one binary table.
///
/// Rows are buffered column by column; [`finish`](Self::finish) creates the
/// table extension and writes every column in one pass.
pub struct FitsTableWriter {
    path: PathBuf,
    extname: String,
    schema: TableSchema,
    columns: Vec<ColumnData>,
    rows_written: usize,
}

impl FitsTableWriter {
    /// Validate the column layout and claim `path`, so an unwritable
    /// location fails before any row is buffered.
    pub fn create(path: &Path, extname: &str, columns: Vec<ColumnSpec>) -> Result<Self> {
        for spec in &columns {
            spec.description()?;
        }
        File::create(path).map_err(|e| FpError::output(path, e))?;

        let schema = TableSchema::new(columns);
        Ok(Self {
            path: path.to_path_buf(),
            extname: extname.to_string(),
            columns: schema.columns().iter().map(ColumnData::empty).collect(),
            schema,
            rows_written: 0,
        })
    }

    /// Create a table whose layout is the record type's column list.
    pub fn create_for<R: ToRow>(path: &Path, extname: &str) -> Result<Self> {
        Self::create(path, extname, R::columns())
    }

    pub fn write_record<R: ToRow>(&mut self, record: &R) -> Result<()> {
        let mut row = RowEncoder::new(&self.schema);
        record.encode(&mut row)?;
        for (column, cell) in self.columns.iter_mut().zip(row.into_cells()) {
            column.extend(&cell);
        }
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the primary HDU, the table extension and all buffered rows.
    pub fn finish(self) -> Result<()> {
        let fits_err = |e: fitsio::errors::Error| FpError::Fits {
            path: self.path.clone(),
            reason: e.to_string(),
        };
        let descriptions = self
            .schema
            .columns()
            .iter()
            .map(ColumnSpec::description)
            .collect::<Result<Vec<_>>>()?;

        let mut file = FitsFile::create(&self.path)
            .overwrite()
            .open()
            .map_err(fits_err)?;
        let hdu = file
            .create_table(self.extname.clone(), &descriptions)
            .map_err(fits_err)?;
        if self.rows_written == 0 {
            return Ok(());
        }

        for (spec, data) in self.schema.columns().iter().zip(&self.columns) {
            match data {
                ColumnData::Int(values) => {
                    hdu.write_col(&mut file, spec.name.as_str(), values.as_slice())
                }
                ColumnData::Float(values) => {
                    hdu.write_col(&mut file, spec.name.as_str(), values.as_slice())
                }
            }
            .map_err(fits_err)?;
        }
        Ok(())
    }
}
