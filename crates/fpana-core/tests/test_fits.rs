mod common;

use std::path::Path;

use fpana_core::catalog::{ExposureSummary, ForcedSource};
use fpana_core::error::{FpError, Result};
use fpana_core::io::{ColumnKind, ColumnSpec, FitsTableReader, FitsTableWriter, RowEncoder, ToRow};

use common::{measurement, write_forced_sources};

/// FITS logical record size.
const BLOCK: usize = 2880;
const CARD: usize = 80;

/// A forcedsources-like row whose flux column is stored as an integer.
struct IntegerFluxRow {
    id: i64,
    flux: i64,
}

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
        row.put_i64("id", self.id)?;
        row.put_i64("objectId", self.id)?;
        row.put_i64("flux_psf", self.flux)?;
        row.put_f64("refFlux", 0.0)?;
        row.put_f64s("coord", &[0.1, 0.2])
    }
}

struct IdOnlyRow(i64);

impl ToRow for IdOnlyRow {
    fn columns() -> Vec<ColumnSpec> {
        vec![ColumnSpec::scalar("id", ColumnKind::Int64)]
    }

    fn encode(&self, row: &mut RowEncoder<'_>) -> Result<()> {
        row.put_i64("id", self.0)
    }
}

/// Overwrite the value field of the last `keyword` header card.
fn patch_card(path: &Path, keyword: &str, value: &str) {
    let mut bytes = std::fs::read(path).unwrap();
    let key = format!("{keyword:<8}= ");
    let index = bytes
        .chunks(CARD)
        .rposition(|card| card.starts_with(key.as_bytes()))
        .unwrap();
    let start = index * CARD + 10;
    bytes[start..start + 20].copy_from_slice(format!("{value:>20}").as_bytes());
    std::fs::write(path, bytes).unwrap();
}

/// Open and load every row, surfacing the first failure.
fn load_all(path: &Path) -> Result<usize> {
    let mut reader = FitsTableReader::open(path)?;
    let rows = reader.row_count();
    Ok(reader.read_rows(0, rows)?.len())
}

// ---------------------------------------------------------------------------
// Writer / reader
// ---------------------------------------------------------------------------

#[test]
fn test_written_table_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fs.fits");
    let rows = vec![
        measurement(1, 100, 12.5, 10.0, -20.0),
        measurement(2, 101, -3.0, 350.0, 45.0),
        measurement(3, 102, f64::NAN, 0.0, 0.0),
    ];
    write_forced_sources(&path, &rows);

    let len = std::fs::metadata(&path).unwrap().len() as usize;
    assert_eq!(len % BLOCK, 0);

    let mut reader = FitsTableReader::open(&path).unwrap();
    assert_eq!(reader.extname(), Some("forcedsources"));
    assert_eq!(reader.row_count(), 3);
    assert_eq!(reader.schema().columns().len(), 5);
    assert_eq!(reader.schema().find("coord").unwrap().repeat, 2);

    let back = reader.decode_rows::<ForcedSource>(0, 10).unwrap();
    assert_eq!(back.len(), 3);
    assert_eq!(back[0], rows[0]);
    assert_eq!(back[1], rows[1]);
    assert!(back[2].flux.is_nan());
}

#[test]
fn test_read_rows_clips_to_table_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fs.fits");
    let rows: Vec<ForcedSource> = (0..5)
        .map(|i| measurement(i, i, i as f64, 1.0, 1.0))
        .collect();
    write_forced_sources(&path, &rows);

    let mut reader = FitsTableReader::open(&path).unwrap();
    let chunk = reader.read_rows(3, 10).unwrap();
    assert_eq!(chunk.len(), 2);
    assert_eq!(chunk.first_row(), 3);
    assert!(reader.read_rows(7, 2).unwrap().is_empty());

    let tail = reader.decode_rows::<ForcedSource>(3, 10).unwrap();
    assert_eq!(tail[0].id, 3);
    assert_eq!(tail[1].id, 4);
    assert_eq!(tail[1].coord, rows[4].coord);
}

#[test]
fn test_empty_table_has_zero_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.fits");
    write_forced_sources(&path, &[]);

    let mut reader = FitsTableReader::open(&path).unwrap();
    assert_eq!(reader.row_count(), 0);
    assert!(reader.decode_rows::<ForcedSource>(0, 100).unwrap().is_empty());
}

#[test]
fn test_array_and_int32_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sum.fits");
    let mut summary = ExposureSummary::new(4263, 120, 14);
    summary.nsrc = 17;
    summary.id_mnx = [5, 90];
    summary.ra_mnx = [10.5, 11.25];
    summary.nflux_ok = 3;
    summary.flux_mean = 42.0;
    let mut second = ExposureSummary::new(4263, 121, 14);
    second.oid_mnx = [-3, 3];
    second.flux_mnx = [0.5, 1.5];

    let mut writer = FitsTableWriter::create_for::<ExposureSummary>(&path, "fpfsum").unwrap();
    writer.write_record(&summary).unwrap();
    writer.write_record(&second).unwrap();
    assert_eq!(writer.rows_written(), 2);
    writer.finish().unwrap();

    let mut reader = FitsTableReader::open(&path).unwrap();
    assert_eq!(reader.schema().find("ra_mnx").unwrap().tform(), "2D");
    assert_eq!(reader.schema().find("run").unwrap().kind, ColumnKind::Int32);
    let back = reader.decode_rows::<ExposureSummary>(0, 2).unwrap();
    assert_eq!(back[0], summary);
    assert_eq!(back[1], second);
}

#[test]
fn test_create_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fs.fits");
    std::fs::write(&path, b"previous contents").unwrap();
    write_forced_sources(&path, &[measurement(1, 1, 1.0, 1.0, 1.0)]);

    assert_eq!(FitsTableReader::open(&path).unwrap().row_count(), 1);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn test_wrong_column_type_is_malformed_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.fits");
    let mut writer =
        FitsTableWriter::create(&path, "forcedsources", IntegerFluxRow::columns()).unwrap();
    writer.write_record(&IntegerFluxRow { id: 1, flux: 12 }).unwrap();
    writer.write_record(&IntegerFluxRow { id: 2, flux: 13 }).unwrap();
    writer.finish().unwrap();

    let mut reader = FitsTableReader::open(&path).unwrap();
    let err = reader.decode_rows::<ForcedSource>(1, 1).unwrap_err();
    match err {
        FpError::MalformedRow { path: p, row, .. } => {
            assert_eq!(p, path);
            assert_eq!(row, 1);
        }
        other => panic!("expected MalformedRow, got {other:?}"),
    }
}

#[test]
fn test_missing_column_is_malformed_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.fits");
    let mut writer =
        FitsTableWriter::create(&path, "t", vec![ColumnSpec::scalar("id", ColumnKind::Int64)])
            .unwrap();
    writer.write_record(&IdOnlyRow(9)).unwrap();
    writer.finish().unwrap();

    let mut reader = FitsTableReader::open(&path).unwrap();
    let err = reader.decode_rows::<ForcedSource>(0, 1).unwrap_err();
    assert!(matches!(err, FpError::MalformedRow { row: 0, .. }));
    assert!(err.to_string().contains("objectId"));
}

#[test]
fn test_not_a_fits_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junk.fits");
    std::fs::write(&path, vec![b'x'; BLOCK]).unwrap();
    assert!(matches!(
        FitsTableReader::open(&path),
        Err(FpError::InvalidTable { .. })
    ));
}

#[test]
fn test_truncated_data_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trunc.fits");
    let rows: Vec<ForcedSource> = (0..100)
        .map(|i| measurement(i, i, 1.0, 1.0, 1.0))
        .collect();
    write_forced_sources(&path, &rows);

    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..2 * BLOCK + 100]).unwrap();
    assert!(matches!(load_all(&path), Err(FpError::InvalidTable { .. })));
}

#[test]
fn test_negative_row_count_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("naxis2.fits");
    write_forced_sources(&path, &[measurement(1, 1, 1.0, 1.0, 1.0)]);
    patch_card(&path, "NAXIS2", "-1");

    assert!(matches!(load_all(&path), Err(FpError::InvalidTable { .. })));
}

#[test]
fn test_negative_field_count_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tfields.fits");
    write_forced_sources(&path, &[measurement(1, 1, 1.0, 1.0, 1.0)]);
    patch_card(&path, "TFIELDS", "-1");

    assert!(matches!(load_all(&path), Err(FpError::InvalidTable { .. })));
}

#[test]
fn test_huge_row_count_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.fits");
    write_forced_sources(&path, &[measurement(1, 1, 1.0, 1.0, 1.0)]);
    patch_card(&path, "NAXIS2", &i64::MAX.to_string());

    assert!(matches!(load_all(&path), Err(FpError::InvalidTable { .. })));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        FitsTableReader::open(&dir.path().join("nope.fits")),
        Err(FpError::Io(_))
    ));
}
