//! Typed records read from and written to binary tables.

use crate::consts::RAD2DEG;
use crate::error::Result;
use crate::io::table::{ColumnKind, ColumnSpec, FromRow, Row, RowEncoder, ToRow};
use crate::sky::RaDec;

/// One forced-photometry measurement (a row of a `forcedsources-*` file).
/// Coordinates are in radians, as stored on disk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForcedSource {
    pub id: i64,
    pub object_id: i64,
    pub flux: f64,
    pub ref_flux: f64,
    pub coord: [f64; 2],
}

impl ForcedSource {
    /// Position converted to degrees.
    pub fn position(&self) -> RaDec {
        RaDec::new(self.coord[0] * RAD2DEG, self.coord[1] * RAD2DEG)
    }
}

impl FromRow for ForcedSource {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.i64("id")?,
            object_id: row.i64("objectId")?,
            flux: row.f64("flux_psf")?,
            ref_flux: row.f64("refFlux")?,
            coord: row.f64_array::<2>("coord")?,
        })
    }
}

impl ToRow for ForcedSource {
    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::scalar("id", ColumnKind::Int64),
            ColumnSpec::scalar("objectId", ColumnKind::Int64),
            ColumnSpec::scalar("flux_psf", ColumnKind::Float64),
            ColumnSpec::scalar("refFlux", ColumnKind::Float64),
            ColumnSpec::new("coord", ColumnKind::Float64, 2),
        ]
    }

    fn encode(&self, row: &mut RowEncoder<'_>) -> Result<()> {
        row.put_i64("id", self.id)?;
        row.put_i64("objectId", self.object_id)?;
        row.put_f64("flux_psf", self.flux)?;
        row.put_f64("refFlux", self.ref_flux)?;
        row.put_f64s("coord", &self.coord)
    }
}

/// LSST stack catalog entry: id and `coord[2]` in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LsstCatalogEntry {
    pub id: i64,
    pub coord: [f64; 2],
}

impl FromRow for LsstCatalogEntry {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.i64("id")?,
            coord: row.f64_array::<2>("coord")?,
        })
    }
}

/// SDSS catalog entry: id, `ra` and `dec` in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SdssCatalogEntry {
    pub id: i64,
    pub ra: f64,
    pub dec: f64,
}

impl FromRow for SdssCatalogEntry {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.i64("id")?,
            ra: row.f64("ra")?,
            dec: row.f64("dec")?,
        })
    }
}

/// Merged catalog output: id and position in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CatalogPosition {
    pub id: i64,
    pub ra: f64,
    pub dec: f64,
}

impl From<LsstCatalogEntry> for CatalogPosition {
    fn from(e: LsstCatalogEntry) -> Self {
        Self {
            id: e.id,
            ra: e.coord[0] * RAD2DEG,
            dec: e.coord[1] * RAD2DEG,
        }
    }
}

impl From<SdssCatalogEntry> for CatalogPosition {
    fn from(e: SdssCatalogEntry) -> Self {
        Self {
            id: e.id,
            ra: e.ra * RAD2DEG,
            dec: e.dec * RAD2DEG,
        }
    }
}

impl FromRow for CatalogPosition {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.i64("id")?,
            ra: row.f64("ra")?,
            dec: row.f64("dec")?,
        })
    }
}

impl ToRow for CatalogPosition {
    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::scalar("id", ColumnKind::Int64),
            ColumnSpec::scalar("ra", ColumnKind::Float64),
            ColumnSpec::scalar("dec", ColumnKind::Float64),
        ]
    }

    fn encode(&self, row: &mut RowEncoder<'_>) -> Result<()> {
        row.put_i64("id", self.id)?;
        row.put_f64("ra", self.ra)?;
        row.put_f64("dec", self.dec)
    }
}

/// Per-exposure summary (one row of `fpfsum.fits`).
#[derive(Clone, Debug, PartialEq)]
pub struct ExposureSummary {
    pub run: i32,
    pub field: i32,
    pub camcol_filter: i32,
    pub nsrc: i32,
    pub ra_mnx: [f64; 2],
    pub dec_mnx: [f64; 2],
    pub id_mnx: [i64; 2],
    pub oid_mnx: [i64; 2],
    pub flux_mnx: [f64; 2],
    pub nflux_ok: i32,
    pub flux_mean: f64,
}

impl ExposureSummary {
    /// Empty summary with min/max accumulators at their sentinels.
    pub fn new(run: i32, field: i32, camcol_filter: i32) -> Self {
        Self {
            run,
            field,
            camcol_filter,
            nsrc: 0,
            ra_mnx: [f64::MAX, -f64::MAX],
            dec_mnx: [f64::MAX, -f64::MAX],
            id_mnx: [i64::MAX, -i64::MAX],
            oid_mnx: [i64::MAX, -i64::MAX],
            flux_mnx: [f64::MAX, -f64::MAX],
            nflux_ok: 0,
            flux_mean: 0.0,
        }
    }
}

impl FromRow for ExposureSummary {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            run: row.i64("run")? as i32,
            field: row.i64("field")? as i32,
            camcol_filter: row.i64("camcol_filter")? as i32,
            nsrc: row.i64("nsrc")? as i32,
            ra_mnx: row.f64_array::<2>("ra_mnx")?,
            dec_mnx: row.f64_array::<2>("dec_mnx")?,
            id_mnx: row.i64_array::<2>("id_mnx")?,
            oid_mnx: row.i64_array::<2>("oid_mnx")?,
            flux_mnx: row.f64_array::<2>("flux_mnx")?,
            nflux_ok: row.i64("nfluxok")? as i32,
            flux_mean: row.f64("fluxmean")?,
        })
    }
}

impl ToRow for ExposureSummary {
    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::scalar("run", ColumnKind::Int32),
            ColumnSpec::scalar("field", ColumnKind::Int32),
            ColumnSpec::scalar("camcol_filter", ColumnKind::Int32),
            ColumnSpec::scalar("nsrc", ColumnKind::Int32),
            ColumnSpec::new("ra_mnx", ColumnKind::Float64, 2),
            ColumnSpec::new("dec_mnx", ColumnKind::Float64, 2),
            ColumnSpec::new("id_mnx", ColumnKind::Int64, 2),
            ColumnSpec::new("oid_mnx", ColumnKind::Int64, 2),
            ColumnSpec::new("flux_mnx", ColumnKind::Float64, 2),
            ColumnSpec::scalar("nfluxok", ColumnKind::Int32),
            ColumnSpec::scalar("fluxmean", ColumnKind::Float64),
        ]
    }

    fn encode(&self, row: &mut RowEncoder<'_>) -> Result<()> {
        row.put_i64("run", self.run as i64)?;
        row.put_i64("field", self.field as i64)?;
        row.put_i64("camcol_filter", self.camcol_filter as i64)?;
        row.put_i64("nsrc", self.nsrc as i64)?;
        row.put_f64s("ra_mnx", &self.ra_mnx)?;
        row.put_f64s("dec_mnx", &self.dec_mnx)?;
        row.put_i64s("id_mnx", &self.id_mnx)?;
        row.put_i64s("oid_mnx", &self.oid_mnx)?;
        row.put_f64s("flux_mnx", &self.flux_mnx)?;
        row.put_i64("nfluxok", self.nflux_ok as i64)?;
        row.put_f64("fluxmean", self.flux_mean)
    }
}
