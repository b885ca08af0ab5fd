#![allow(dead_code)]

use std::path::{Path, PathBuf};

use fpana_core::aggregate::VariancePolicy;
use fpana_core::catalog::ForcedSource;
use fpana_core::config::{FilePlan, FluxWindow, JobConfig};
use fpana_core::exposure::{CamCol, ExposureFile, Filter, RunFieldCamCol, RunFieldMinMax};
use fpana_core::error::Result;
use fpana_core::io::{ColumnKind, ColumnSpec, FitsTableWriter, RowEncoder, ToRow};
use fpana_core::sky::SkyGrid;

/// Build a measurement from a position in degrees (stored in radians).
pub fn measurement(id: i64, object_id: i64, flux: f64, ra: f64, dec: f64) -> ForcedSource {
    ForcedSource {
        id,
        object_id,
        flux,
        ref_flux: flux,
        coord: [ra.to_radians(), dec.to_radians()],
    }
}

/// Write a `forcedsources` table at `path`, creating parent directories.
pub fn write_forced_sources(path: &Path, rows: &[ForcedSource]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create exposure directory");
    }
    let mut writer =
        FitsTableWriter::create_for::<ForcedSource>(path, "forcedsources").expect("create table");
    for row in rows {
        writer.write_record(row).expect("write row");
    }
    writer.finish().expect("finish table");
}

/// Write an exposure file at its naming-convention location under `base`.
pub fn write_exposure(
    base: &Path,
    run: u32,
    field: u32,
    camcol: u8,
    filter: Filter,
    rows: &[ForcedSource],
) -> PathBuf {
    let file = ExposureFile::new(base, run, field, CamCol::new(camcol).unwrap(), filter);
    write_forced_sources(&file.path, rows);
    file.path
}

/// A forcedsources row whose `flux_psf` column is declared as an integer.
struct IntegerFluxRow(i64);

impl ToRow for IntegerFluxRow {
    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::scalar("id", ColumnKind::Int64),
            ColumnSpec::scalar("objectId", ColumnKind::Int64),
            ColumnSpec::scalar("flux_psf", ColumnKind::Int32),
            ColumnSpec::scalar("refFlux", ColumnKind::Float64),
            ColumnSpec::new("coord", ColumnKind::Float64, 2),
        ]
    }

    fn encode(&self, row: &mut RowEncoder<'_>) -> Result<()> {
        row.put_i64("id", self.0)?;
        row.put_i64("objectId", self.0)?;
        row.put_i64("flux_psf", 100)?;
        row.put_f64("refFlux", 100.0)?;
        row.put_f64s("coord", &[0.5, 0.1])
    }
}

/// Write an exposure whose rows cannot be decoded as measurements.
pub fn write_malformed_exposure(
    base: &Path,
    run: u32,
    field: u32,
    camcol: u8,
    filter: Filter,
) -> PathBuf {
    let file = ExposureFile::new(base, run, field, CamCol::new(camcol).unwrap(), filter);
    std::fs::create_dir_all(file.path.parent().unwrap()).unwrap();
    let mut writer =
        FitsTableWriter::create(&file.path, "forcedsources", IntegerFluxRow::columns()).unwrap();
    writer.write_record(&IntegerFluxRow(1)).unwrap();
    writer.finish().unwrap();
    file.path
}

/// Job using run/field ranges at camcol 1, filter `i`.
pub fn range_job(base: &Path, out: &Path, ranges: &[(u32, u32, u32)]) -> JobConfig {
    JobConfig {
        base_dir: base.to_path_buf(),
        out_dir: out.to_path_buf(),
        sky: SkyGrid::default(),
        plan: FilePlan::RunFieldRange {
            ranges: ranges
                .iter()
                .map(|&(run, field_min, field_max)| RunFieldMinMax {
                    run,
                    field_min,
                    field_max,
                })
                .collect(),
            camcol: CamCol::new(1).unwrap(),
            filter: Filter::I,
        },
        flux: FluxWindow::default(),
        variance_policy: VariancePolicy::Clamp,
    }
}

/// Job using explicit run/field/camcol triples crossed with `filters`.
pub fn triple_job(
    base: &Path,
    out: &Path,
    entries: &[(u32, u32, u8)],
    filters: &[Filter],
) -> JobConfig {
    JobConfig {
        base_dir: base.to_path_buf(),
        out_dir: out.to_path_buf(),
        sky: SkyGrid::default(),
        plan: FilePlan::RunFieldCamCol {
            entries: entries
                .iter()
                .map(|&(run, field, camcol)| RunFieldCamCol { run, field, camcol })
                .collect(),
            filters: filters.to_vec(),
        },
        flux: FluxWindow::default(),
        variance_policy: VariancePolicy::Clamp,
    }
}
