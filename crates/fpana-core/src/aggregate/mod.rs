mod accumulator;
mod grid;
mod source_list;

pub use accumulator::{FluxAccumulator, FluxSummary, VariancePolicy};
pub use grid::{AddOutcome, AggregatorStats, FinalizedSource, SkyGridAggregator, Source, SourceCatalog};
pub use source_list::{format_source, write_source_list, SOURCE_LIST_HEADER};
