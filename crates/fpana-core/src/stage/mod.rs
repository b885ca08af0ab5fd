mod controller;
mod lifecycle;
mod stats;
mod types;

pub use controller::Controller;
pub use lifecycle::{FileHandler, Lifecycle, Stage, StageContext};
pub use stats::{write_stats_report, RunStats};
pub use types::{NoOpReporter, ProgressReporter, StageState};
