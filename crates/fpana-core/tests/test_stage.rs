mod common;

use std::sync::{Arc, Mutex};

use fpana_core::config::JobConfig;
use fpana_core::error::{FpError, Result};
use fpana_core::exposure::{ExposureFile, Filter};
use fpana_core::jobs::ExposureScanner;
use fpana_core::stage::{Controller, FileHandler, Lifecycle, Stage, StageContext, StageState};

use common::{measurement, range_job, write_exposure, write_malformed_exposure};

/// Records every hook call as a string.
#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
    fail_on_field: Option<u32>,
}

impl Recorder {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl FileHandler for Recorder {
    fn configure(&mut self, ctx: &StageContext, _config: &JobConfig) -> Result<()> {
        self.push(format!("configure {}", ctx.files.len()));
        Ok(())
    }

    fn start(&mut self, _ctx: &StageContext) -> Result<()> {
        self.push("start".into());
        Ok(())
    }

    fn process_file(&mut self, _ctx: &StageContext, file: &ExposureFile) -> Result<()> {
        if self.fail_on_field == Some(file.field) {
            return Err(FpError::Pipeline(format!("field {}", file.field)));
        }
        self.push(format!("file {} {}", file.run, file.field));
        Ok(())
    }

    fn stop(&mut self, ctx: &StageContext) -> Result<()> {
        self.push(format!("stop {}", ctx.stats.files));
        Ok(())
    }
}

fn write_fields(base: &std::path::Path, run: u32, fields: &[u32]) {
    for &field in fields {
        write_exposure(
            base,
            run,
            field,
            1,
            Filter::I,
            &[measurement(field as i64, 1, 10.0, 30.0, 30.0)],
        );
    }
}

// ---------------------------------------------------------------------------
// Lifecycle order
// ---------------------------------------------------------------------------

#[test]
fn test_out_of_order_calls_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = range_job(dir.path(), &dir.path().join("out"), &[(1, 1, 1)]);
    let mut stage = Stage::new("guard", Recorder::default());

    assert!(matches!(stage.start(), Err(FpError::Lifecycle { .. })));
    assert!(matches!(stage.process(), Err(FpError::Lifecycle { .. })));
    assert_eq!(stage.state(), StageState::Created);

    stage.configure(&cfg).unwrap();
    assert!(matches!(stage.configure(&cfg), Err(FpError::Lifecycle { .. })));
    assert!(matches!(stage.stop(), Err(FpError::Lifecycle { .. })));

    stage.start().unwrap();
    stage.process().unwrap();
    stage.stop().unwrap();
    assert_eq!(stage.state(), StageState::Stopped);
    assert!(matches!(stage.process(), Err(FpError::Lifecycle { .. })));
}

#[test]
fn test_hooks_run_in_lifecycle_order() {
    let dir = tempfile::tempdir().unwrap();
    write_fields(dir.path(), 7, &[1, 2]);
    let cfg = range_job(dir.path(), &dir.path().join("out"), &[(7, 1, 2)]);
    let recorder = Recorder::default();
    let mut stage = Stage::new("order", recorder.clone());

    stage.configure(&cfg).unwrap();
    stage.start().unwrap();
    stage.process().unwrap();
    stage.stop().unwrap();

    assert_eq!(
        recorder.calls(),
        vec!["configure 2", "start", "file 7 1", "file 7 2", "stop 2"]
    );
    assert!(dir.path().join("out").is_dir());
}

// ---------------------------------------------------------------------------
// Missing and bad files
// ---------------------------------------------------------------------------

#[test]
fn test_missing_file_is_counted_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_fields(dir.path(), 7, &[1, 3]);
    let cfg = range_job(dir.path(), &dir.path().join("out"), &[(7, 1, 3)]);
    let recorder = Recorder::default();
    let mut stage = Stage::new("missing", recorder.clone());

    stage.configure(&cfg).unwrap();
    stage.start().unwrap();
    stage.process().unwrap();

    let stats = *stage.stats();
    assert_eq!(stats.files, 3);
    assert_eq!(stats.missing_files, 1);
    assert_eq!(stats.bad_files, 0);
    assert!(stats.total_bytes > 0);
    assert_eq!(recorder.calls()[1..], ["start", "file 7 1", "file 7 3"]);
}

#[test]
fn test_run_field_ranges_track_existing_files_only() {
    let dir = tempfile::tempdir().unwrap();
    write_fields(dir.path(), 7, &[2, 3]);
    write_fields(dir.path(), 9, &[5]);
    let cfg = range_job(dir.path(), &dir.path().join("out"), &[(9, 5, 6), (7, 1, 4)]);
    let mut stage = Stage::new("runs", Recorder::default());

    stage.configure(&cfg).unwrap();
    stage.start().unwrap();
    stage.process().unwrap();

    let runs = &stage.context().run_fields;
    assert_eq!(runs.len(), 2);
    let r7 = runs.get(7).unwrap();
    assert_eq!((r7.field_min, r7.field_max), (2, 3));
    let r9 = runs.get(9).unwrap();
    assert_eq!((r9.field_min, r9.field_max), (5, 5));
    let order: Vec<u32> = runs.iter().map(|r| r.run).collect();
    assert_eq!(order, vec![7, 9]);
}

#[test]
fn test_failing_file_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_fields(dir.path(), 7, &[1, 2, 3]);
    let cfg = range_job(dir.path(), &dir.path().join("out"), &[(7, 1, 3)]);
    let recorder = Recorder {
        fail_on_field: Some(2),
        ..Default::default()
    };
    let mut stage = Stage::new("abort", recorder.clone());

    stage.configure(&cfg).unwrap();
    stage.start().unwrap();
    assert!(stage.process().is_err());

    let stats = *stage.stats();
    assert_eq!(stats.files, 2);
    assert_eq!(stats.bad_files, 1);
    assert!(!recorder.calls().contains(&"file 7 3".to_string()));
}

#[test]
fn test_malformed_row_aborts_with_row_location() {
    let dir = tempfile::tempdir().unwrap();
    write_fields(dir.path(), 7, &[1, 3]);
    let bad = write_malformed_exposure(dir.path(), 7, 2, 1, Filter::I);
    let cfg = range_job(dir.path(), &dir.path().join("out"), &[(7, 1, 3)]);
    let mut stage = Stage::new("scan", ExposureScanner::new());

    stage.configure(&cfg).unwrap();
    stage.start().unwrap();
    match stage.process() {
        Err(FpError::MalformedRow { path, row, .. }) => {
            assert_eq!(path, bad);
            assert_eq!(row, 0);
        }
        other => panic!("expected MalformedRow, got {other:?}"),
    }
    assert_eq!(stage.handler().exposures(), 1);
    assert_eq!(stage.stats().files, 2);
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[test]
fn test_controller_runs_all_stages() {
    let dir = tempfile::tempdir().unwrap();
    write_fields(dir.path(), 7, &[1]);
    let cfg = range_job(dir.path(), &dir.path().join("out"), &[(7, 1, 1)]);
    let a = Recorder::default();
    let b = Recorder::default();

    let mut controller = Controller::new(vec![
        Box::new(Stage::new("a", a.clone())),
        Box::new(Stage::new("b", b.clone())),
    ]);
    controller.configure(&cfg).unwrap();
    controller.run().unwrap();

    assert!(controller
        .stages()
        .iter()
        .all(|s| s.state() == StageState::Stopped));
    assert_eq!(a.calls(), b.calls());
}

#[test]
fn test_controller_skips_stop_after_failed_process() {
    let dir = tempfile::tempdir().unwrap();
    write_fields(dir.path(), 7, &[1]);
    let cfg = range_job(dir.path(), &dir.path().join("out"), &[(7, 1, 1)]);
    let failing = Recorder {
        fail_on_field: Some(1),
        ..Default::default()
    };

    let mut controller = Controller::default();
    controller.push(Box::new(Stage::new("failing", failing.clone())));
    controller.configure(&cfg).unwrap();
    assert!(controller.run().is_err());

    assert_eq!(controller.stages()[0].state(), StageState::Processing);
    assert!(!failing.calls().iter().any(|c| c.starts_with("stop")));
}
