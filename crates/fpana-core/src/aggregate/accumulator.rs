use serde::{Deserialize, Serialize};

/// How finalization treats a negative variance produced by rounding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariancePolicy {
    /// Negative radicands become 0.
    #[default]
    Clamp,
    /// Negative radicands yield NaN.
    Propagate,
}

impl std::fmt::Display for VariancePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clamp => write!(f, "clamp"),
            Self::Propagate => write!(f, "propagate"),
        }
    }
}

/// Running `(N, sum, sum of squares)` for one band of one source.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FluxAccumulator {
    pub n: u32,
    pub sum: f64,
    pub sum_sq: f64,
}

impl FluxAccumulator {
    pub fn add(&mut self, flux: f64) {
        self.n += 1;
        self.sum += flux;
        self.sum_sq += flux * flux;
    }

    /// Mean and population standard deviation. Bands never observed
    /// finalize to all zeros.
    pub fn finalize(&self, policy: VariancePolicy) -> FluxSummary {
        if self.n == 0 {
            return FluxSummary::default();
        }
        let n = self.n as f64;
        let mean = self.sum / n;
        let var = self.sum_sq / n - mean * mean;
        let stddev = match policy {
            VariancePolicy::Clamp => var.max(0.0).sqrt(),
            VariancePolicy::Propagate => var.sqrt(),
        };
        FluxSummary {
            n: self.n,
            mean,
            stddev,
        }
    }
}

/// Finalized per-band statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FluxSummary {
    pub n: u32,
    pub mean: f64,
    pub stddev: f64,
}
