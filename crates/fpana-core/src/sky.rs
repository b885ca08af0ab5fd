use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_DEC_MAX, DEFAULT_DEC_MIN, DEFAULT_NB_DEC, DEFAULT_NB_RA, DEFAULT_RA_MAX,
    DEFAULT_RA_MIN, RA_DEC_TOLERANCE_DEG,
};
use crate::error::{FpError, Result};

/// A sky position in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RaDec {
    pub ra: f64,
    pub dec: f64,
}

impl RaDec {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// True when `other` differs from `self` by more than
    /// [`RA_DEC_TOLERANCE_DEG`] on either axis.
    pub fn mismatches(&self, other: &RaDec) -> bool {
        (self.ra - other.ra).abs() > RA_DEC_TOLERANCE_DEG
            || (self.dec - other.dec).abs() > RA_DEC_TOLERANCE_DEG
    }
}

/// Cell coordinates inside a [`SkyGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellIndex {
    pub ra: usize,
    pub dec: usize,
}

/// Fixed-resolution partition of `[ra_min, ra_max) x [dec_min, dec_max)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkyGrid {
    pub ra_min: f64,
    pub ra_max: f64,
    pub dec_min: f64,
    pub dec_max: f64,
    pub nb_ra: usize,
    pub nb_dec: usize,
}

impl Default for SkyGrid {
    fn default() -> Self {
        Self {
            ra_min: DEFAULT_RA_MIN,
            ra_max: DEFAULT_RA_MAX,
            dec_min: DEFAULT_DEC_MIN,
            dec_max: DEFAULT_DEC_MAX,
            nb_ra: DEFAULT_NB_RA,
            nb_dec: DEFAULT_NB_DEC,
        }
    }
}

impl SkyGrid {
    pub fn validate(&self) -> Result<()> {
        if self.nb_ra == 0 || self.nb_dec == 0 {
            return Err(FpError::Config(format!(
                "sky grid needs at least one cell per axis (got {}x{})",
                self.nb_ra, self.nb_dec
            )));
        }
        let finite = [self.ra_min, self.ra_max, self.dec_min, self.dec_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.ra_max <= self.ra_min || self.dec_max <= self.dec_min {
            return Err(FpError::Config(format!(
                "invalid sky bounds ra=[{}, {}) dec=[{}, {})",
                self.ra_min, self.ra_max, self.dec_min, self.dec_max
            )));
        }
        Ok(())
    }

    pub fn delta_ra(&self) -> f64 {
        (self.ra_max - self.ra_min) / self.nb_ra as f64
    }

    pub fn delta_dec(&self) -> f64 {
        (self.dec_max - self.dec_min) / self.nb_dec as f64
    }

    pub fn cell_count(&self) -> usize {
        self.nb_ra * self.nb_dec
    }

    /// Map a position (degrees) to its cell. Positions outside the grid
    /// (including the upper bounds and NaN) yield `None`.
    pub fn cell_of(&self, pos: RaDec) -> Option<CellIndex> {
        let kra = axis_index(pos.ra, self.ra_min, self.delta_ra(), self.nb_ra)?;
        let kdec = axis_index(pos.dec, self.dec_min, self.delta_dec(), self.nb_dec)?;
        Some(CellIndex { ra: kra, dec: kdec })
    }

    /// Flat, dec-major storage index of a cell.
    pub fn flat_index(&self, cell: CellIndex) -> usize {
        cell.dec * self.nb_ra + cell.ra
    }

    /// Cell coordinates of a flat index.
    pub fn cell_at(&self, flat: usize) -> CellIndex {
        CellIndex {
            ra: flat % self.nb_ra,
            dec: flat / self.nb_ra,
        }
    }

    /// Center of a cell, in degrees.
    pub fn cell_center(&self, cell: CellIndex) -> RaDec {
        RaDec {
            ra: self.ra_min + self.delta_ra() * (cell.ra as f64 + 0.5),
            dec: self.dec_min + self.delta_dec() * (cell.dec as f64 + 0.5),
        }
    }
}

fn axis_index(value: f64, min: f64, delta: f64, count: usize) -> Option<usize> {
    let k = ((value - min) / delta).floor();
    if k >= 0.0 && k < count as f64 {
        Some(k as usize)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_bound_maps_to_first_cell() {
        let grid = SkyGrid::default();
        let cell = grid.cell_of(RaDec::new(0.0, -90.0)).unwrap();
        assert_eq!(cell, CellIndex { ra: 0, dec: 0 });
        assert_eq!(grid.flat_index(cell), 0);
    }

    #[test]
    fn upper_bound_is_exclusive() {
        let grid = SkyGrid::default();
        assert!(grid.cell_of(RaDec::new(360.0, 0.0)).is_none());
        assert!(grid.cell_of(RaDec::new(10.0, 90.0)).is_none());
    }

    #[test]
    fn below_range_is_rejected_not_clamped() {
        let grid = SkyGrid::default();
        assert!(grid.cell_of(RaDec::new(-0.001, 0.0)).is_none());
        assert!(grid.cell_of(RaDec::new(f64::NAN, 0.0)).is_none());
    }

    #[test]
    fn flat_index_round_trips_through_cell_at() {
        let grid = SkyGrid::default();
        let cell = grid.cell_of(RaDec::new(125.0, 12.5)).unwrap();
        assert_eq!(cell, CellIndex { ra: 12, dec: 10 });
        assert_eq!(grid.cell_at(grid.flat_index(cell)), cell);
    }
}
