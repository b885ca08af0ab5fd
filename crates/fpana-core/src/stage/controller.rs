use tracing::info;

use crate::config::JobConfig;
use crate::error::Result;

use super::lifecycle::Lifecycle;

/// Runs an ordered list of stages through configure, start, process and
/// stop. Each phase runs across all stages before the next phase begins;
/// the first error is returned and later phases are skipped.
#[derive(Default)]
pub struct Controller {
    stages: Vec<Box<dyn Lifecycle>>,
}

impl Controller {
    pub fn new(stages: Vec<Box<dyn Lifecycle>>) -> Self {
        Self { stages }
    }

    pub fn push(&mut self, stage: Box<dyn Lifecycle>) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Box<dyn Lifecycle>] {
        &self.stages
    }

    pub fn configure(&mut self, config: &JobConfig) -> Result<()> {
        info!("configure...");
        for stage in &mut self.stages {
            stage.configure(config)?;
        }
        Ok(())
    }

    pub fn run(&mut self) -> Result<()> {
        info!("run...");

        info!("start...");
        for stage in &mut self.stages {
            stage.start()?;
        }
        info!("start... [done]");

        info!("process...");
        for stage in &mut self.stages {
            stage.process()?;
        }
        info!("process... [done]");

        info!("stop...");
        for stage in &mut self.stages {
            stage.stop()?;
        }
        info!("stop... [done]");

        info!("run... [done]");
        Ok(())
    }
}
