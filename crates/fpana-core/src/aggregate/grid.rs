use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::catalog::ForcedSource;
use crate::config::FluxWindow;
use crate::error::{FpError, Result};
use crate::sky::{RaDec, SkyGrid};

use super::accumulator::{FluxAccumulator, FluxSummary, VariancePolicy};

/// Counters gathered while aggregating measurements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregatorStats {
    pub measurements: u64,
    pub bad_measurements: u64,
    pub out_of_range: u64,
    pub measurements_in_range: u64,
    pub objects: u64,
    pub ra_dec_mismatches: u64,
}

impl AggregatorStats {
    pub fn log(&self, stage: &str) {
        info!(
            stage,
            measures = self.measurements,
            bad_meas = self.bad_measurements,
            meas_in = self.measurements_in_range,
            out_of_range = self.out_of_range,
            objects = self.objects,
            err_radec = self.ra_dec_mismatches,
            "Aggregation statistics"
        );
    }
}

/// What happened to one measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// Flux was NaN or infinite; nothing was accumulated.
    BadFlux,
    /// Position fell outside the sky grid; nothing was accumulated.
    OutOfRange,
    /// First sighting of the object in its cell.
    NewSource,
    /// Accumulated into an existing source. `mismatch` is set when the
    /// position disagrees with the representative one beyond tolerance.
    Updated { mismatch: bool },
}

/// An object seen in one cell, with per-band accumulators.
#[derive(Clone, Debug, PartialEq)]
pub struct Source {
    pub id: i64,
    pub object_id: i64,
    /// Position of the first sighting.
    pub position: RaDec,
    pub bands: Vec<FluxAccumulator>,
}

/// A source after finalization.
#[derive(Clone, Debug, PartialEq)]
pub struct FinalizedSource {
    pub id: i64,
    pub object_id: i64,
    pub position: RaDec,
    pub bands: Vec<FluxSummary>,
}

/// Bins measurements into sky cells and accumulates per-object, per-band
/// flux statistics. Objects are keyed by `objectId` within a cell only; the
/// same object seen in two cells yields two sources.
pub struct SkyGridAggregator {
    grid: SkyGrid,
    nbands: usize,
    cells: Vec<BTreeMap<i64, Source>>,
    stats: AggregatorStats,
}

impl SkyGridAggregator {
    pub fn new(grid: SkyGrid, nbands: usize) -> Self {
        let cells = vec![BTreeMap::new(); grid.cell_count()];
        Self {
            grid,
            nbands,
            cells,
            stats: AggregatorStats::default(),
        }
    }

    pub fn grid(&self) -> &SkyGrid {
        &self.grid
    }

    pub fn nbands(&self) -> usize {
        self.nbands
    }

    pub fn stats(&self) -> &AggregatorStats {
        &self.stats
    }

    /// Sources of one cell, ordered by object id.
    pub fn cell(&self, flat_index: usize) -> Option<&BTreeMap<i64, Source>> {
        self.cells.get(flat_index)
    }

    /// Look up the source of `object_id` in the cell containing `pos`.
    pub fn source_at(&self, pos: RaDec, object_id: i64) -> Option<&Source> {
        let cell = self.grid.cell_of(pos)?;
        self.cells[self.grid.flat_index(cell)].get(&object_id)
    }

    /// Feed one measurement (coordinates in radians) for `band`.
    pub fn add(&mut self, band: usize, m: &ForcedSource) -> Result<AddOutcome> {
        if band >= self.nbands {
            return Err(FpError::BandOutOfRange {
                band,
                bands: self.nbands,
            });
        }
        self.stats.measurements += 1;

        if !m.flux.is_finite() {
            self.stats.bad_measurements += 1;
            return Ok(AddOutcome::BadFlux);
        }

        let pos = m.position();
        let Some(cell) = self.grid.cell_of(pos) else {
            self.stats.out_of_range += 1;
            return Ok(AddOutcome::OutOfRange);
        };
        self.stats.measurements_in_range += 1;

        let nbands = self.nbands;
        let sources = &mut self.cells[self.grid.flat_index(cell)];
        match sources.get_mut(&m.object_id) {
            Some(source) => {
                let mismatch = source.position.mismatches(&pos);
                if mismatch {
                    self.stats.ra_dec_mismatches += 1;
                }
                source.bands[band].add(m.flux);
                Ok(AddOutcome::Updated { mismatch })
            }
            None => {
                let mut source = Source {
                    id: m.id,
                    object_id: m.object_id,
                    position: pos,
                    bands: vec![FluxAccumulator::default(); nbands],
                };
                source.bands[band].add(m.flux);
                sources.insert(m.object_id, source);
                self.stats.objects += 1;
                Ok(AddOutcome::NewSource)
            }
        }
    }

    /// Consume the aggregator and finalize every source, in cell index
    /// order then object id order. When `window` is given, sources whose
    /// band-0 mean falls outside it are dropped.
    pub fn finalize(self, policy: VariancePolicy, window: Option<FluxWindow>) -> SourceCatalog {
        let grid = self.grid;
        let per_cell: Vec<Vec<FinalizedSource>> = self
            .cells
            .into_par_iter()
            .enumerate()
            .map(|(i, sources)| {
                let center = grid.cell_center(grid.cell_at(i));
                debug!(
                    cell = i,
                    ra = center.ra,
                    dec = center.dec,
                    sources = sources.len(),
                    "Finalizing cell"
                );
                sources
                    .into_values()
                    .map(|s| FinalizedSource {
                        id: s.id,
                        object_id: s.object_id,
                        position: s.position,
                        bands: s.bands.iter().map(|b| b.finalize(policy)).collect(),
                    })
                    .filter(|s| match window {
                        Some(w) => w.contains(s.bands.first().map_or(0.0, |b| b.mean)),
                        None => true,
                    })
                    .collect()
            })
            .collect();

        SourceCatalog {
            sources: per_cell.into_iter().flatten().collect(),
            nbands: self.nbands,
            stats: self.stats,
        }
    }
}

/// Finalized output of an aggregation run.
#[derive(Clone, Debug)]
pub struct SourceCatalog {
    pub sources: Vec<FinalizedSource>,
    pub nbands: usize,
    pub stats: AggregatorStats,
}
