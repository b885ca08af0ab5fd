use fpana_core::stage::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};

/// Drives one indicatif bar per stage.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar().template("{msg:12} [{bar:40}] {pos}/{len} files") {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: &str, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.set_position(0);
        self.bar.set_message(stage.to_string());
    }

    fn advance(&self, files_done: usize) {
        self.bar.set_position(files_done as u64);
    }

    fn finish_stage(&self) {
        self.bar.finish_with_message("Done");
    }
}
