use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aggregate::VariancePolicy;
use crate::consts::{DEFAULT_FLUX_MAX, DEFAULT_FLUX_MIN, DEFAULT_RANGE_CAMCOL, DEFAULT_RANGE_FILTER};
use crate::error::{FpError, Result};
use crate::exposure::{CamCol, ExposureFile, Filter, RunFieldCamCol, RunFieldMinMax};
use crate::sky::SkyGrid;

/// Flux acceptance window `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluxWindow {
    pub min: f64,
    pub max: f64,
}

impl Default for FluxWindow {
    fn default() -> Self {
        Self {
            min: DEFAULT_FLUX_MIN,
            max: DEFAULT_FLUX_MAX,
        }
    }
}

impl FluxWindow {
    /// Inclusive test, used when filtering finalized sources.
    pub fn contains(&self, flux: f64) -> bool {
        flux >= self.min && flux <= self.max
    }

    /// Exclusive test, used for per-exposure accepted-flux counts.
    pub fn contains_exclusive(&self, flux: f64) -> bool {
        flux > self.min && flux < self.max
    }
}

/// The two supported ways of enumerating input files.
#[derive(Clone, Debug, PartialEq)]
pub enum FilePlan {
    /// Run/field ranges at a fixed camcol and filter.
    RunFieldRange {
        ranges: Vec<RunFieldMinMax>,
        camcol: CamCol,
        filter: Filter,
    },
    /// Explicit run/field/camcol triples crossed with a filter list.
    RunFieldCamCol {
        entries: Vec<RunFieldCamCol>,
        filters: Vec<Filter>,
    },
}

impl FilePlan {
    /// Filters that appear in the plan, in plan order.
    pub fn filters(&self) -> Vec<Filter> {
        match self {
            Self::RunFieldRange { filter, .. } => vec![*filter],
            Self::RunFieldCamCol { filters, .. } => filters.clone(),
        }
    }

    /// Expand the plan into exposure files, sorted by `(run, field)`.
    /// The sort is stable so camcol/filter order within a field follows
    /// the plan.
    pub fn expand(&self, base_dir: &Path) -> Result<Vec<ExposureFile>> {
        let mut files = Vec::new();
        match self {
            Self::RunFieldRange {
                ranges,
                camcol,
                filter,
            } => {
                for r in ranges {
                    for field in r.field_min..=r.field_max {
                        files.push(ExposureFile::new(base_dir, r.run, field, *camcol, *filter));
                    }
                }
            }
            Self::RunFieldCamCol { entries, filters } => {
                for e in entries {
                    let camcol = CamCol::new(e.camcol)?;
                    for filter in filters {
                        files.push(ExposureFile::new(base_dir, e.run, e.field, camcol, *filter));
                    }
                }
            }
        }
        files.sort_by_key(|f| (f.run, f.field));
        Ok(files)
    }
}

/// Validated job configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawJobConfig", into = "RawJobConfig")]
pub struct JobConfig {
    pub base_dir: PathBuf,
    pub out_dir: PathBuf,
    pub sky: SkyGrid,
    pub plan: FilePlan,
    pub flux: FluxWindow,
    pub variance_policy: VariancePolicy,
}

impl JobConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FpError::Config(e.to_string().trim().to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FpError::Config(e.to_string()))
    }
}

/// On-disk shape of the job file, before validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawJobConfig {
    #[serde(default)]
    pub base_dir: PathBuf,
    #[serde(default)]
    pub out_dir: PathBuf,
    #[serde(default = "default_flux")]
    pub flux: [f64; 2],
    #[serde(default)]
    pub variance_policy: VariancePolicy,
    #[serde(default = "default_range_camcol")]
    pub range_camcol: u8,
    #[serde(default = "default_range_filter")]
    pub range_filter: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
    #[serde(default)]
    pub sky: SkyGrid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_field_ranges: Option<Vec<RunFieldMinMax>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_field_camcols: Option<Vec<RunFieldCamCol>>,
}

fn default_flux() -> [f64; 2] {
    [DEFAULT_FLUX_MIN, DEFAULT_FLUX_MAX]
}

fn default_range_camcol() -> u8 {
    DEFAULT_RANGE_CAMCOL
}

fn default_range_filter() -> String {
    DEFAULT_RANGE_FILTER.to_string()
}

impl TryFrom<RawJobConfig> for JobConfig {
    type Error = FpError;

    fn try_from(raw: RawJobConfig) -> Result<Self> {
        raw.sky.validate()?;

        let [min, max] = raw.flux;
        if min.is_nan() || max.is_nan() || min > max {
            return Err(FpError::Config(format!(
                "invalid flux window [{}, {}]",
                min, max
            )));
        }

        let ranges = raw.run_field_ranges.filter(|r| !r.is_empty());
        let triples = raw.run_field_camcols.filter(|t| !t.is_empty());

        let plan = match (ranges, triples) {
            (Some(ranges), triples) => {
                if triples.is_some() {
                    warn!("both run_field_ranges and run_field_camcols given; using run_field_ranges");
                }
                if let Some(bad) = ranges.iter().find(|r| r.field_min > r.field_max) {
                    return Err(FpError::Config(format!(
                        "run {}: field_min {} > field_max {}",
                        bad.run, bad.field_min, bad.field_max
                    )));
                }
                FilePlan::RunFieldRange {
                    ranges,
                    camcol: CamCol::new(raw.range_camcol)?,
                    filter: Filter::parse(&raw.range_filter)?,
                }
            }
            (None, Some(entries)) => {
                for e in &entries {
                    CamCol::new(e.camcol)?;
                }
                let filters = raw
                    .filters
                    .iter()
                    .map(|s| Filter::parse(s))
                    .collect::<Result<Vec<_>>>()?;
                if filters.is_empty() {
                    return Err(FpError::Config(
                        "run_field_camcols needs a non-empty filters list".into(),
                    ));
                }
                FilePlan::RunFieldCamCol { entries, filters }
            }
            (None, None) => {
                return Err(FpError::Config(
                    "one needs either a run_field_ranges or a run_field_camcols list".into(),
                ));
            }
        };

        Ok(Self {
            base_dir: raw.base_dir,
            out_dir: raw.out_dir,
            sky: raw.sky,
            plan,
            flux: FluxWindow { min, max },
            variance_policy: raw.variance_policy,
        })
    }
}

impl From<JobConfig> for RawJobConfig {
    fn from(cfg: JobConfig) -> Self {
        let mut raw = RawJobConfig {
            base_dir: cfg.base_dir,
            out_dir: cfg.out_dir,
            sky: cfg.sky,
            flux: [cfg.flux.min, cfg.flux.max],
            variance_policy: cfg.variance_policy,
            run_field_ranges: None,
            range_camcol: DEFAULT_RANGE_CAMCOL,
            range_filter: default_range_filter(),
            run_field_camcols: None,
            filters: Vec::new(),
        };
        match cfg.plan {
            FilePlan::RunFieldRange {
                ranges,
                camcol,
                filter,
            } => {
                raw.run_field_ranges = Some(ranges);
                raw.range_camcol = camcol.id();
                raw.range_filter = filter.to_string();
            }
            FilePlan::RunFieldCamCol { entries, filters } => {
                raw.run_field_camcols = Some(entries);
                raw.filters = filters.iter().map(|f| f.to_string()).collect();
            }
        }
        raw
    }
}
