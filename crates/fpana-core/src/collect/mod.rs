//! Concurrent worker/collector pipeline: N producers, one consumer owning
//! the output sink.

mod catalog_worker;
mod pipeline;
mod sink;

use std::path::Path;

use crate::catalog::CatalogPosition;
use crate::error::Result;

pub use catalog_worker::{CatalogKind, CatalogWorker};
pub use pipeline::{
    run_collect, CollectSummary, CompletionLatch, RecordSender, RecordSink, ScanWorker,
};
pub use sink::{FitsRecordSink, MERGED_EXTNAME};

/// Merge catalog files into one `astro` table at `output`, one worker per
/// input file.
pub fn merge_catalogs(
    inputs: &[impl AsRef<Path>],
    kind: CatalogKind,
    output: &Path,
) -> Result<CollectSummary> {
    let workers: Vec<CatalogWorker> = inputs
        .iter()
        .map(|p| CatalogWorker::new(p.as_ref(), kind))
        .collect();
    let sink = FitsRecordSink::create::<CatalogPosition>(output)?;
    let (sink, summary) = run_collect(workers, sink)?;
    sink.finish()?;
    Ok(summary)
}
