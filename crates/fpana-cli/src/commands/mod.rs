pub mod config;
pub mod info;
pub mod list;
pub mod merge;
pub mod scan;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use fpana_core::config::JobConfig;
use fpana_core::stage::{Controller, FileHandler, Stage};

use crate::progress::BarReporter;
use crate::summary::print_job_summary;

/// Load a job file, print its summary and run one stage through the
/// controller.
pub(crate) fn run_stage<H: FileHandler + 'static>(
    config_path: &Path,
    name: &str,
    handler: H,
) -> Result<JobConfig> {
    let config = JobConfig::load(config_path)
        .with_context(|| format!("Failed to load job config {}", config_path.display()))?;
    print_job_summary(name, &config);

    let stage = Stage::new(name, handler).with_reporter(Arc::new(BarReporter::new()));
    let mut controller = Controller::new(vec![Box::new(stage)]);
    controller
        .configure(&config)
        .context("Failed to configure job")?;
    controller
        .run()
        .with_context(|| format!("Stage {name} failed"))?;
    Ok(config)
}
