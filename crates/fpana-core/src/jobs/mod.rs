//! Concrete stages run by the `fpana` binary.

mod list_builder;
mod scanner;

pub use list_builder::SourceListBuilder;
pub use scanner::{ExposureScanner, SUMMARY_EXTNAME};
