use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::aggregate::{write_source_list, SkyGridAggregator, SourceCatalog};
use crate::catalog::ForcedSource;
use crate::consts::{SCAN_BATCH_ROWS, SOURCE_LIST_FILE, SOURCE_LIST_STATS_FILE};
use crate::error::{FpError, Result};
use crate::exposure::{ExposureFile, Filter};
use crate::io::FitsTableReader;
use crate::stage::{write_stats_report, FileHandler, StageContext};

/// Aggregates measurements of every exposure into per-object, per-band
/// flux statistics on the sky grid and writes the source list on stop.
#[derive(Default)]
pub struct SourceListBuilder {
    bands: HashMap<Filter, usize>,
    aggregator: Option<SkyGridAggregator>,
    catalog: Option<SourceCatalog>,
}

impl SourceListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Band index assigned to `filter`, if it is part of the plan.
    pub fn band_of(&self, filter: Filter) -> Option<usize> {
        self.bands.get(&filter).copied()
    }

    /// Live aggregator, between start and stop.
    pub fn aggregator(&self) -> Option<&SkyGridAggregator> {
        self.aggregator.as_ref()
    }

    /// Finalized catalog, available after stop.
    pub fn catalog(&self) -> Option<&SourceCatalog> {
        self.catalog.as_ref()
    }
}

impl FileHandler for SourceListBuilder {
    fn start(&mut self, ctx: &StageContext) -> Result<()> {
        self.bands = ctx
            .filters
            .iter()
            .enumerate()
            .map(|(band, filter)| (*filter, band))
            .collect();
        self.aggregator = Some(SkyGridAggregator::new(ctx.sky.clone(), ctx.filters.len()));
        info!(
            stage = %ctx.name,
            bands = ctx.filters.len(),
            cells = ctx.sky.cell_count(),
            "Aggregator ready"
        );
        Ok(())
    }

    fn process_file(&mut self, _ctx: &StageContext, file: &ExposureFile) -> Result<()> {
        let Some(band) = self.band_of(file.filter) else {
            warn!(
                path = %file.path.display(),
                filter = %file.filter,
                "Filter is not part of the plan, skipping file"
            );
            return Ok(());
        };
        let aggregator = self
            .aggregator
            .as_mut()
            .ok_or_else(|| FpError::Pipeline("aggregator is not started".into()))?;

        let mut reader = FitsTableReader::open(&file.path)?;
        let total = reader.row_count();
        if total == 0 {
            return Err(FpError::EmptyTable {
                path: file.path.clone(),
            });
        }

        let mut offset = 0;
        while offset < total {
            for m in reader.decode_rows::<ForcedSource>(offset, SCAN_BATCH_ROWS)? {
                aggregator.add(band, &m)?;
            }
            offset += SCAN_BATCH_ROWS;
        }
        debug!(path = %file.path.display(), band, rows = total, "Exposure aggregated");
        Ok(())
    }

    fn stop(&mut self, ctx: &StageContext) -> Result<()> {
        let Some(aggregator) = self.aggregator.take() else {
            return Ok(());
        };
        aggregator.stats().log(&ctx.name);

        let catalog = aggregator.finalize(ctx.variance_policy, Some(ctx.flux));
        let written = write_source_list(&ctx.out_path(SOURCE_LIST_FILE), &catalog)?;
        write_stats_report(
            &ctx.out_path(SOURCE_LIST_STATS_FILE),
            &ctx.stats,
            &ctx.run_fields,
            Some(&catalog.stats),
        )?;
        info!(stage = %ctx.name, sources = written, "Source list written");

        self.catalog = Some(catalog);
        Ok(())
    }
}
