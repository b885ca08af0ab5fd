use std::fmt;

/// Lifecycle position of a stage. Transitions are strictly forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageState {
    Created,
    Configured,
    Started,
    Processing,
    Stopped,
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Configured => write!(f, "configured"),
            Self::Started => write!(f, "started"),
            Self::Processing => write!(f, "processing"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Thread-safe progress reporting for stage processing.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A stage has started processing `total_files` files.
    fn begin_stage(&self, _stage: &str, _total_files: usize) {}

    /// `files_done` files have been handled so far (skipped ones included).
    fn advance(&self, _files_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when none is supplied.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
