use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{CatalogPosition, LsstCatalogEntry, SdssCatalogEntry};
use crate::consts::SCAN_BATCH_ROWS;
use crate::error::{FpError, Result};
use crate::io::FitsTableReader;

use super::pipeline::{RecordSender, ScanWorker};

/// Layout of an input catalog table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// `id` plus `coord[2]` (radians).
    Lsst,
    /// `id`, `ra`, `dec` (radians).
    Sdss,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lsst => write!(f, "lsst"),
            Self::Sdss => write!(f, "sdss"),
        }
    }
}

/// Streams every row of one catalog file as a [`CatalogPosition`] in
/// degrees.
#[derive(Clone, Debug)]
pub struct CatalogWorker {
    pub path: PathBuf,
    pub kind: CatalogKind,
}

impl CatalogWorker {
    pub fn new(path: impl Into<PathBuf>, kind: CatalogKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    fn stream<E>(
        reader: &mut FitsTableReader,
        out: &RecordSender<CatalogPosition>,
    ) -> Result<usize>
    where
        E: crate::io::FromRow + Into<CatalogPosition>,
    {
        let total = reader.row_count();
        let mut offset = 0;
        while offset < total {
            for entry in reader.decode_rows::<E>(offset, SCAN_BATCH_ROWS)? {
                out.send(entry.into())?;
            }
            offset += SCAN_BATCH_ROWS;
        }
        Ok(total)
    }
}

impl ScanWorker for CatalogWorker {
    type Record = CatalogPosition;

    fn label(&self) -> String {
        format!("{} ({})", self.path.display(), self.kind)
    }

    fn scan(self, out: &RecordSender<CatalogPosition>) -> Result<()> {
        if !self.path.exists() {
            return Err(FpError::MissingFile { path: self.path });
        }
        let mut reader = FitsTableReader::open(&self.path)?;
        let rows = match self.kind {
            CatalogKind::Lsst => Self::stream::<LsstCatalogEntry>(&mut reader, out)?,
            CatalogKind::Sdss => Self::stream::<SdssCatalogEntry>(&mut reader, out)?,
        };
        debug!(path = %self.path.display(), rows, "Catalog scanned");
        Ok(())
    }
}
