use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::aggregate::VariancePolicy;
use crate::config::{FluxWindow, JobConfig};
use crate::error::{FpError, Result};
use crate::exposure::{ExposureFile, Filter, RunFieldDb};
use crate::sky::SkyGrid;

use super::stats::RunStats;
use super::types::{NoOpReporter, ProgressReporter, StageState};

/// Shared, read-mostly state of a stage, handed to the file handler.
#[derive(Clone, Debug)]
pub struct StageContext {
    pub name: String,
    pub base_dir: PathBuf,
    pub out_dir: PathBuf,
    pub sky: SkyGrid,
    pub flux: FluxWindow,
    pub variance_policy: VariancePolicy,
    /// Filters of the plan, in plan order.
    pub filters: Vec<Filter>,
    /// File plan, consumed by `process`.
    pub files: Vec<ExposureFile>,
    pub stats: RunStats,
    pub run_fields: RunFieldDb,
}

impl StageContext {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base_dir: PathBuf::new(),
            out_dir: PathBuf::new(),
            sky: SkyGrid::default(),
            flux: FluxWindow::default(),
            variance_policy: VariancePolicy::default(),
            filters: Vec::new(),
            files: Vec::new(),
            stats: RunStats::default(),
            run_fields: RunFieldDb::default(),
        }
    }

    /// Path of an artifact inside the output directory.
    pub fn out_path(&self, file_name: &str) -> PathBuf {
        self.out_dir.join(file_name)
    }
}

/// Per-stage behavior. Only `process_file` is mandatory; the other hooks
/// run after the stage's own configure/start/stop work.
pub trait FileHandler {
    fn configure(&mut self, _ctx: &StageContext, _config: &JobConfig) -> Result<()> {
        Ok(())
    }

    fn start(&mut self, _ctx: &StageContext) -> Result<()> {
        Ok(())
    }

    /// Handle one existing input file. An error aborts the stage run.
    fn process_file(&mut self, ctx: &StageContext, file: &ExposureFile) -> Result<()>;

    fn stop(&mut self, _ctx: &StageContext) -> Result<()> {
        Ok(())
    }
}

/// Object-safe lifecycle driven by the [`Controller`](super::Controller).
pub trait Lifecycle {
    fn name(&self) -> &str;
    fn state(&self) -> StageState;
    fn stats(&self) -> &RunStats;
    fn configure(&mut self, config: &JobConfig) -> Result<()>;
    fn start(&mut self) -> Result<()>;
    fn process(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}

/// A batch stage: enumerates the file plan and feeds each file to `H`.
pub struct Stage<H: FileHandler> {
    ctx: StageContext,
    handler: H,
    state: StageState,
    reporter: Arc<dyn ProgressReporter>,
}

impl<H: FileHandler> Stage<H> {
    pub fn new(name: &str, handler: H) -> Self {
        Self {
            ctx: StageContext::new(name),
            handler,
            state: StageState::Created,
            reporter: Arc::new(NoOpReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn context(&self) -> &StageContext {
        &self.ctx
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    fn expect_state(&self, action: &'static str, expected: StageState) -> Result<()> {
        if self.state != expected {
            return Err(FpError::Lifecycle {
                stage: self.ctx.name.clone(),
                action,
                state: self.state.to_string(),
            });
        }
        Ok(())
    }
}

impl<H: FileHandler> Lifecycle for Stage<H> {
    fn name(&self) -> &str {
        &self.ctx.name
    }

    fn state(&self) -> StageState {
        self.state
    }

    fn stats(&self) -> &RunStats {
        &self.ctx.stats
    }

    fn configure(&mut self, config: &JobConfig) -> Result<()> {
        self.expect_state("configure", StageState::Created)?;

        self.ctx.base_dir = config.base_dir.clone();
        self.ctx.out_dir = config.out_dir.clone();
        self.ctx.sky = config.sky.clone();
        self.ctx.flux = config.flux;
        self.ctx.variance_policy = config.variance_policy;
        self.ctx.filters = config.plan.filters();
        self.ctx.files = config.plan.expand(&config.base_dir)?;
        info!(
            stage = %self.ctx.name,
            files = self.ctx.files.len(),
            filters = ?self.ctx.filters,
            "Configured file plan"
        );

        self.handler.configure(&self.ctx, config)?;
        self.state = StageState::Configured;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.expect_state("start", StageState::Configured)?;

        let out_dir = &self.ctx.out_dir;
        if !out_dir.as_os_str().is_empty() && !out_dir.exists() {
            std::fs::create_dir_all(out_dir).map_err(|e| FpError::output(out_dir, e))?;
            debug!(dir = %out_dir.display(), "Created output directory");
        }

        self.handler.start(&self.ctx)?;
        self.state = StageState::Started;
        Ok(())
    }

    fn process(&mut self) -> Result<()> {
        self.expect_state("process", StageState::Started)?;
        self.state = StageState::Processing;

        let files = std::mem::take(&mut self.ctx.files);
        self.reporter.begin_stage(&self.ctx.name, files.len());

        for (i, file) in files.iter().enumerate() {
            self.ctx.stats.files += 1;
            match std::fs::metadata(&file.path) {
                Err(_) => {
                    self.ctx.stats.missing_files += 1;
                    warn!(path = %file.path.display(), "Missing input file, skipping");
                }
                Ok(meta) => {
                    self.ctx.stats.total_bytes += meta.len();
                    self.ctx.run_fields.record(file.run, file.field);
                    if let Err(e) = self.handler.process_file(&self.ctx, file) {
                        self.ctx.stats.bad_files += 1;
                        error!(
                            stage = %self.ctx.name,
                            path = %file.path.display(),
                            error = %e,
                            "Aborting run"
                        );
                        return Err(e);
                    }
                }
            }
            self.reporter.advance(i + 1);
        }

        self.reporter.finish_stage();
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.expect_state("stop", StageState::Processing)?;

        self.ctx.stats.log(&self.ctx.name);
        self.handler.stop(&self.ctx)?;
        self.state = StageState::Stopped;
        Ok(())
    }
}
