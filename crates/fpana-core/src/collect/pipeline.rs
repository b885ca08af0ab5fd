use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Condvar, Mutex};
use std::thread;

use tracing::{debug, info};

use crate::error::{FpError, Result};

/// Sending half handed to each worker. Every message is either a record or
/// the error that ended the worker.
pub struct RecordSender<T> {
    tx: Sender<Result<T>>,
}

impl<T> RecordSender<T> {
    /// Submit one record. Fails once the collector has stopped receiving.
    pub fn send(&self, record: T) -> Result<()> {
        self.tx
            .send(Ok(record))
            .map_err(|_| FpError::CollectorDisconnected)
    }

    fn send_error(&self, err: FpError) {
        // A closed channel means the collector already aborted on an
        // earlier error.
        let _ = self.tx.send(Err(err));
    }
}

/// A producer scanning one input and streaming its records.
pub trait ScanWorker: Send {
    type Record: Send;

    /// Short description used in logs (usually the input path).
    fn label(&self) -> String;

    /// Stream every record through `out`. Returning an error ends this
    /// worker and, through the collector, the whole run.
    fn scan(self, out: &RecordSender<Self::Record>) -> Result<()>;
}

/// The single consumer of collected records.
pub trait RecordSink<T> {
    fn write_record(&mut self, record: &T) -> Result<()>;
}

impl<T: Clone> RecordSink<T> for Vec<T> {
    fn write_record(&mut self, record: &T) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Countdown latch: `wait` returns once `count_down` has been called as
/// many times as the initial count.
pub struct CompletionLatch {
    remaining: Mutex<usize>,
    zero: Condvar,
}

impl CompletionLatch {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            zero: Condvar::new(),
        }
    }

    pub fn count_down(&self) {
        let mut remaining = self.remaining.lock().unwrap_or_else(|p| p.into_inner());
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.zero.notify_all();
        }
    }

    pub fn wait(&self) {
        let mut remaining = self.remaining.lock().unwrap_or_else(|p| p.into_inner());
        while *remaining > 0 {
            remaining = self.zero.wait(remaining).unwrap_or_else(|p| p.into_inner());
        }
    }
}

/// Counts the latch down when a worker exits, including by panic.
struct CountDownOnDrop<'a>(&'a CompletionLatch);

impl Drop for CountDownOnDrop<'_> {
    fn drop(&mut self) {
        self.0.count_down();
    }
}

/// Result of a completed worker/collector run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectSummary {
    pub workers: usize,
    pub records: usize,
}

/// Message sent by the collector once it has drained the channel: the sink
/// (handed back for finalization) and the outcome of the drain.
type DoneSignal<S> = (S, Result<usize>);

/// Run one thread per worker plus one collector thread.
///
/// Workers submit records over one unbounded channel. The collector owns
/// `sink` exclusively and appends every record; the first error message
/// aborts it. A panicking worker sends an [`FpError::Pipeline`] error.
/// After all workers have signalled the completion latch the channel is
/// closed, and this function waits for the collector's done signal before
/// returning the sink. Record order across workers is not defined.
pub fn run_collect<W, S>(workers: Vec<W>, sink: S) -> Result<(S, CollectSummary)>
where
    W: ScanWorker,
    S: RecordSink<W::Record> + Send,
{
    let nworkers = workers.len();
    let (tx, rx) = mpsc::channel::<Result<W::Record>>();
    let (done_tx, done_rx) = mpsc::channel::<DoneSignal<S>>();
    let latch = CompletionLatch::new(nworkers);

    info!(workers = nworkers, "Starting workers");
    let (sink, outcome) = thread::scope(|s| {
        s.spawn(move || collect(rx, sink, done_tx));

        for worker in workers {
            let out = RecordSender { tx: tx.clone() };
            let latch = &latch;
            s.spawn(move || {
                let _done = CountDownOnDrop(latch);
                let label = worker.label();
                debug!(worker = %label, "Worker started");
                // A panic ends the worker like an error does.
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| worker.scan(&out)))
                    .unwrap_or_else(|_| {
                        Err(FpError::Pipeline(format!("worker {label} panicked")))
                    });
                if let Err(e) = outcome {
                    debug!(worker = %label, error = %e, "Worker failed");
                    out.send_error(e);
                }
                drop(out);
            });
        }

        latch.wait();
        // Last sender: dropping it closes the channel.
        drop(tx);
        done_rx.recv().map_err(|_| {
            FpError::Pipeline("collector exited without a done signal".into())
        })
    })?;

    let records = outcome?;
    info!(workers = nworkers, records, "Collector done");
    Ok((
        sink,
        CollectSummary {
            workers: nworkers,
            records,
        },
    ))
}

fn collect<T, S: RecordSink<T>>(rx: Receiver<Result<T>>, mut sink: S, done: Sender<DoneSignal<S>>) {
    let mut written = 0usize;
    let mut outcome = Ok(());
    for msg in rx.iter() {
        match msg.and_then(|record| sink.write_record(&record)) {
            Ok(()) => written += 1,
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }
    debug!(records = written, "Stopping collector");
    let _ = done.send((sink, outcome.map(|_| written)));
}
