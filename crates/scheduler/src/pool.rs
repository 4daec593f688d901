//! Fixed-size worker pool.
//!
//! Jobs go out on a bounded queue, results come back on a second queue.
//! Workers stop on a poison pill; the main thread collects exactly one
//! result per submitted job before joining them.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use pixelpose_common::{PixelposeError, PixelposeResult};
use pixelpose_pose_model::{RenderJob, RenderJobResult};
use pixelpose_render_engine::JobProcessor;
use serde::{Deserialize, Serialize};

/// Progress callback invoked on the main thread after every result.
pub type ProgressCallback = Box<dyn Fn(BatchProgress) + Send>;

/// Running totals for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchProgress {
    /// Results received so far.
    pub completed: usize,

    /// Jobs submitted.
    pub total: usize,

    /// Frames produced by successful jobs so far.
    pub frames_rendered: u64,

    /// Failed jobs so far.
    pub errors: usize,
}

enum WorkItem {
    Job(RenderJob),
    Stop,
}

/// Everything a finished batch produced, in completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub count_only: bool,
    pub workers: usize,
    pub results: Vec<RenderJobResult>,
}

impl BatchReport {
    pub fn jobs(&self) -> usize {
        self.results.len()
    }

    /// Frames produced by successful jobs.
    pub fn frames_rendered(&self) -> u64 {
        self.results
            .iter()
            .filter(|r| !r.error)
            .map(|r| r.frames_rendered)
            .sum()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| !r.error).count()
    }

    pub fn errors(&self) -> usize {
        self.results.iter().filter(|r| r.error).count()
    }

    /// Results ordered by `(target, source)`, matching submission order.
    pub fn sorted_by_job(&self) -> Vec<&RenderJobResult> {
        let mut sorted: Vec<&RenderJobResult> = self.results.iter().collect();
        sorted.sort_by(|a, b| {
            (&a.job.target_path, &a.job.source_path).cmp(&(&b.job.target_path, &b.job.source_path))
        });
        sorted
    }
}

/// A pool of `workers` threads sharing one job processor.
pub struct WorkerPool {
    workers: usize,
    processor: Arc<dyn JobProcessor>,
}

impl WorkerPool {
    pub fn new(workers: usize, processor: Arc<dyn JobProcessor>) -> Self {
        Self {
            workers: workers.max(1),
            processor,
        }
    }

    /// Process every job and block until all results are in.
    pub fn run(
        &self,
        jobs: Vec<RenderJob>,
        count_only: bool,
        progress: Option<ProgressCallback>,
    ) -> PixelposeResult<BatchReport> {
        let started_at = Utc::now();
        let total = jobs.len();
        let workers = self.workers.min(total);

        if total == 0 {
            return Ok(BatchReport {
                started_at,
                finished_at: Utc::now(),
                count_only,
                workers: 0,
                results: vec![],
            });
        }

        tracing::info!(jobs = total, workers, count_only, "Starting batch");

        let (job_tx, job_rx) = bounded::<WorkItem>(workers * 2);
        let (result_tx, result_rx) = unbounded::<RenderJobResult>();

        let mut handles = Vec::with_capacity(workers);
        for index in 0..workers {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            let processor = Arc::clone(&self.processor);
            let handle = thread::Builder::new()
                .name(format!("pixelpose-worker-{index}"))
                .spawn(move || worker_loop(index, jobs, results, processor, count_only))
                .map_err(|e| PixelposeError::setup(format!("Failed to spawn worker: {e}")))?;
            handles.push(handle);
        }
        drop(job_rx);
        drop(result_tx);

        let feeder = thread::Builder::new()
            .name("pixelpose-feeder".to_string())
            .spawn(move || feed(job_tx, jobs, workers))
            .map_err(|e| PixelposeError::setup(format!("Failed to spawn job feeder: {e}")))?;

        let mut results = Vec::with_capacity(total);
        let mut state = BatchProgress {
            total,
            ..BatchProgress::default()
        };
        while results.len() < total {
            let result = result_rx.recv().map_err(|_| {
                PixelposeError::setup(format!(
                    "Workers exited after {} of {} results",
                    results.len(),
                    total
                ))
            })?;

            state.completed += 1;
            if result.error {
                state.errors += 1;
            } else {
                state.frames_rendered += result.frames_rendered;
            }
            if let Some(cb) = &progress {
                cb(state);
            }
            results.push(result);
        }

        if feeder.join().is_err() {
            tracing::warn!("Job feeder panicked");
        }
        for handle in handles {
            if handle.join().is_err() {
                tracing::warn!("Worker thread panicked outside a job");
            }
        }

        let report = BatchReport {
            started_at,
            finished_at: Utc::now(),
            count_only,
            workers,
            results,
        };
        tracing::info!(
            jobs = report.jobs(),
            succeeded = report.succeeded(),
            errors = report.errors(),
            frames = report.frames_rendered(),
            "Batch finished"
        );
        Ok(report)
    }
}

/// Enqueue every job, then one stop marker per worker.
fn feed(queue: Sender<WorkItem>, jobs: Vec<RenderJob>, workers: usize) {
    for job in jobs {
        if queue.send(WorkItem::Job(job)).is_err() {
            return;
        }
    }
    for _ in 0..workers {
        if queue.send(WorkItem::Stop).is_err() {
            return;
        }
    }
}

fn worker_loop(
    index: usize,
    jobs: Receiver<WorkItem>,
    results: Sender<RenderJobResult>,
    processor: Arc<dyn JobProcessor>,
    count_only: bool,
) {
    tracing::debug!(worker = index, "Worker started");
    while let Ok(WorkItem::Job(job)) = jobs.recv() {
        tracing::debug!(
            worker = index,
            source = %job.source_path.display(),
            target = %job.target_path.display(),
            "Processing job"
        );
        let result = panic::catch_unwind(AssertUnwindSafe(|| processor.process(&job, count_only)))
            .unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                tracing::error!(worker = index, error = %message, "Job panicked");
                RenderJobResult::failure(job.clone(), 0, format!("Worker panicked: {message}"))
            });
        if results.send(result).is_err() {
            break;
        }
    }
    tracing::debug!(worker = index, "Worker stopped");
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
