/// Radians to degrees conversion factor.
pub const RAD2DEG: f64 = 180.0 / std::f64::consts::PI;

/// Two measurements of the same object farther apart than this (in degrees,
/// on either axis) are counted as a ra/dec mismatch. 2 arc-seconds.
pub const RA_DEC_TOLERANCE_DEG: f64 = 2.0 / 3600.0;

/// Default sky region: the full sphere in 10x10 degree cells.
pub const DEFAULT_RA_MIN: f64 = 0.0;
pub const DEFAULT_RA_MAX: f64 = 360.0;
pub const DEFAULT_DEC_MIN: f64 = -90.0;
pub const DEFAULT_DEC_MAX: f64 = 90.0;
pub const DEFAULT_NB_RA: usize = 36;
pub const DEFAULT_NB_DEC: usize = 18;

/// Default flux acceptance window.
pub const DEFAULT_FLUX_MIN: f64 = 0.0;
pub const DEFAULT_FLUX_MAX: f64 = 5.0e5;

/// Camcol and filter used when the plan is given as run/field ranges.
pub const DEFAULT_RANGE_CAMCOL: u8 = 1;
pub const DEFAULT_RANGE_FILTER: char = 'i';

/// Number of rows loaded per `read_rows` call when scanning a table.
pub const SCAN_BATCH_ROWS: usize = 4096;

/// Output file names written into the job output directory.
pub const SUMMARY_TABLE_FILE: &str = "fpfsum.fits";
pub const STATS_FILE: &str = "stats.txt";
pub const SOURCE_LIST_FILE: &str = "srclist.txt";
pub const SOURCE_LIST_STATS_FILE: &str = "srclist-stats.txt";
