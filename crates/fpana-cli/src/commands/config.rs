use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use fpana_core::aggregate::VariancePolicy;
use fpana_core::config::{FilePlan, FluxWindow, JobConfig};
use fpana_core::exposure::{CamCol, Filter, RunFieldMinMax};
use fpana_core::sky::SkyGrid;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a default JobConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = JobConfig {
        base_dir: PathBuf::from("/data/forced"),
        out_dir: PathBuf::from("out"),
        sky: SkyGrid::default(),
        plan: FilePlan::RunFieldRange {
            ranges: vec![RunFieldMinMax {
                run: 4263,
                field_min: 120,
                field_max: 130,
            }],
            camcol: CamCol::new(1)?,
            filter: Filter::I,
        },
        flux: FluxWindow::default(),
        variance_policy: VariancePolicy::default(),
    };
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
