use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::encode::png::{frame_file_name, write_indexed_png};
use crate::foundation::error::{PlaceError, PlaceResult};
use crate::render::renderer::RenderOpts;
use crate::render::sink::{EncodeReport, Snapshot, SnapshotSink};

struct Job {
    path: PathBuf,
    snapshot: Snapshot,
}

#[derive(Debug, Default)]
struct Counts {
    submitted: u64,
    written: u64,
    failed: u64,
}

impl Counts {
    fn outstanding(&self) -> u64 {
        self.submitted - self.written - self.failed
    }
}

#[derive(Debug, Default)]
struct Tracker {
    counts: Mutex<Counts>,
    settled: Condvar,
}

impl Tracker {
    fn lock(&self) -> MutexGuard<'_, Counts> {
        self.counts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn settle(&self, ok: bool) {
        let mut c = self.lock();
        if ok {
            c.written += 1;
        } else {
            c.failed += 1;
        }
        self.settled.notify_all();
    }
}

/// Fixed-size pool of background PNG encoders fed through a bounded queue.
///
/// Submission never blocks on the channel: when the queue is full the caller sleeps for the
/// configured retry delay and tries again, so no snapshot is dropped. A failed job is logged and
/// counted; it never aborts the renderer.
pub struct EncoderPool {
    out_dir: PathBuf,
    tx: Option<SyncSender<Job>>,
    workers: Vec<JoinHandle<()>>,
    tracker: Arc<Tracker>,
    retry_delay: Duration,
    finish_timeout: Duration,
}

impl EncoderPool {
    /// Start `opts.encoder_threads` workers writing frames into `out_dir`.
    pub fn new(out_dir: &Path, opts: &RenderOpts) -> PlaceResult<Self> {
        opts.validate()?;
        std::fs::create_dir_all(out_dir).map_err(|e| PlaceError::io(out_dir, e))?;

        let (tx, rx) = mpsc::sync_channel::<Job>(opts.queue_capacity);
        let rx = Arc::new(Mutex::new(rx));
        let tracker = Arc::new(Tracker::default());

        let mut workers = Vec::with_capacity(opts.encoder_threads);
        for i in 0..opts.encoder_threads {
            let rx = Arc::clone(&rx);
            let tracker = Arc::clone(&tracker);
            let handle = std::thread::Builder::new()
                .name(format!("place-encoder-{i}"))
                .spawn(move || worker_loop(&rx, &tracker))
                .map_err(|e| PlaceError::encode(format!("failed to spawn encoder thread: {e}")))?;
            workers.push(handle);
        }

        tracing::debug!(
            threads = opts.encoder_threads,
            queue = opts.queue_capacity,
            out = %out_dir.display(),
            "encoder pool started"
        );
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            tx: Some(tx),
            workers,
            tracker,
            retry_delay: Duration::from_millis(opts.retry_delay_ms),
            finish_timeout: Duration::from_millis(opts.finish_timeout_ms),
        })
    }

    /// Directory frames are written to.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Queue one snapshot, retrying while the queue is full.
    pub fn submit(&self, snapshot: Snapshot) -> PlaceResult<()> {
        let Some(tx) = &self.tx else {
            return Err(PlaceError::encode("encoder pool already finished"));
        };
        let path = self
            .out_dir
            .join(frame_file_name(snapshot.epoch, snapshot.cutoff_ms)?);

        self.tracker.lock().submitted += 1;
        let mut job = Job { path, snapshot };
        let mut retries = 0u32;
        loop {
            match tx.try_send(job) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(back)) => {
                    if retries == 0 {
                        tracing::warn!(path = %back.path.display(), "encoder queue full, retrying");
                    }
                    retries += 1;
                    job = back;
                    std::thread::sleep(self.retry_delay);
                }
                Err(TrySendError::Disconnected(back)) => {
                    self.tracker.lock().submitted -= 1;
                    return Err(PlaceError::encode(format!(
                        "encoder workers gone, cannot queue '{}'",
                        back.path.display()
                    )));
                }
            }
        }
    }

    /// Close the queue and wait up to the configured timeout for outstanding jobs.
    ///
    /// Jobs still running after the timeout are reported as pending and left to finish in the
    /// background.
    pub fn finish(&mut self) -> PlaceResult<EncodeReport> {
        drop(self.tx.take());

        let report = {
            let guard = self.tracker.lock();
            let (c, timeout) = self
                .tracker
                .settled
                .wait_timeout_while(guard, self.finish_timeout, |c| c.outstanding() > 0)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if timeout.timed_out() && c.outstanding() > 0 {
                tracing::warn!(
                    pending = c.outstanding(),
                    timeout_ms = self.finish_timeout.as_millis() as u64,
                    "encoder pool did not drain in time"
                );
            }
            EncodeReport {
                written: c.written,
                failed: c.failed,
                pending: c.outstanding(),
            }
        };

        if report.pending == 0 {
            for handle in self.workers.drain(..) {
                if handle.join().is_err() {
                    tracing::error!("encoder worker panicked");
                }
            }
        }
        Ok(report)
    }
}

impl SnapshotSink for EncoderPool {
    fn push_snapshot(&mut self, snapshot: Snapshot) -> PlaceResult<()> {
        self.submit(snapshot)
    }

    fn finish(&mut self) -> PlaceResult<EncodeReport> {
        EncoderPool::finish(self)
    }
}

fn worker_loop(rx: &Mutex<Receiver<Job>>, tracker: &Tracker) {
    loop {
        let job = {
            let rx = rx.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            match rx.recv() {
                Ok(job) => job,
                Err(_) => return,
            }
        };
        match write_indexed_png(&job.path, &job.snapshot) {
            Ok(()) => {
                tracing::debug!(path = %job.path.display(), "frame written");
                tracker.settle(true);
            }
            Err(e) => {
                tracing::error!(path = %job.path.display(), error = %e, "frame encode failed");
                tracker.settle(false);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/pool.rs"]
mod tests;
