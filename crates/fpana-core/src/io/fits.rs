use std::path::{Path, PathBuf};

use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::FitsFile;
use tracing::debug;

use crate::error::{FpError, Result};
use crate::io::table::{ColumnData, ColumnSpec, FromRow, TableChunk, TableSchema};

/// Reader for the first binary-table extension of a FITS file.
pub struct FitsTableReader {
    path: PathBuf,
    file: FitsFile,
    hdu: FitsHdu,
    schema: TableSchema,
    extname: Option<String>,
    rows: usize,
}

impl FitsTableReader {
    /// Open a FITS file and move to HDU 1, which must be a table.
    ///
    /// A path that cannot be stat'ed is an I/O error. Anything the FITS
    /// library rejects, a negative or unreadable `NAXIS1`/`NAXIS2`, or row
    /// data larger than the file is an [`FpError::InvalidTable`].
    pub fn open(path: &Path) -> Result<Self> {
        let file_len = std::fs::metadata(path)?.len();
        let invalid = |reason: String| FpError::InvalidTable {
            path: path.to_path_buf(),
            reason,
        };

        let mut file = FitsFile::open(path).map_err(|e| invalid(e.to_string()))?;
        let hdu = file
            .hdu(1)
            .map_err(|e| invalid(format!("no table extension: {e}")))?;

        let specs = match &hdu.info {
            HduInfo::TableInfo {
                column_descriptions,
                ..
            } => column_descriptions
                .iter()
                .filter_map(|desc| {
                    let spec = ColumnSpec::from_description(desc);
                    if spec.is_none() {
                        debug!(
                            path = %path.display(),
                            column = %desc.name,
                            "Skipping column of unsupported type"
                        );
                    }
                    spec
                })
                .collect(),
            _ => return Err(invalid("HDU 1 is not a table".into())),
        };

        let mut count = |key: &str| -> Result<usize> {
            let value = hdu
                .read_key::<i64>(&mut file, key)
                .map_err(|e| invalid(format!("cannot read {key}: {e}")))?;
            usize::try_from(value).map_err(|_| invalid(format!("invalid {key} = {value}")))
        };
        let row_bytes = count("NAXIS1")?;
        let rows = count("NAXIS2")?;
        // The row data alone must fit in the file.
        row_bytes
            .checked_mul(rows)
            .filter(|&bytes| bytes as u64 <= file_len)
            .ok_or_else(|| {
                invalid(format!(
                    "{rows} rows of {row_bytes} bytes exceed the file size ({file_len} bytes)"
                ))
            })?;
        let extname = hdu.read_key::<String>(&mut file, "EXTNAME").ok();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            hdu,
            schema: TableSchema::new(specs),
            extname,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extname(&self) -> Option<&str> {
        self.extname.as_deref()
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Load rows `[offset, offset + count)`, clipped to the table length.
    pub fn read_rows(&mut self, offset: usize, count: usize) -> Result<TableChunk> {
        let end = offset.saturating_add(count).min(self.rows);
        let start = offset.min(end);
        let range = start..end;

        let mut columns = Vec::with_capacity(self.schema.columns().len());
        for spec in self.schema.columns() {
            if range.is_empty() {
                columns.push(ColumnData::empty(spec));
                continue;
            }
            let data = if spec.kind.is_integer() {
                self.hdu
                    .read_col_range(&mut self.file, spec.name.as_str(), &range)
                    .map(ColumnData::Int)
            } else {
                self.hdu
                    .read_col_range(&mut self.file, spec.name.as_str(), &range)
                    .map(ColumnData::Float)
            };
            let data = data.map_err(|e| FpError::InvalidTable {
                path: self.path.clone(),
                reason: format!("reading column {} rows {start}..{end}: {e}", spec.name),
            })?;
            if data.len() != range.len() * spec.repeat {
                return Err(FpError::InvalidTable {
                    path: self.path.clone(),
                    reason: format!(
                        "column {} returned {} values for {} rows",
                        spec.name,
                        data.len(),
                        range.len()
                    ),
                });
            }
            columns.push(data);
        }
        Ok(TableChunk::new(self.schema.clone(), columns, start, range.len()))
    }

    /// Decode rows into typed records. A decode failure is reported as a
    /// malformed row carrying the file path and absolute row index.
    pub fn decode_rows<R: FromRow>(&mut self, offset: usize, count: usize) -> Result<Vec<R>> {
        let chunk = self.read_rows(offset, count)?;
        chunk
            .rows()
            .enumerate()
            .map(|(i, row)| {
                R::from_row(&row).map_err(|e| FpError::MalformedRow {
                    path: self.path.clone(),
                    row: chunk.first_row() + i,
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}
