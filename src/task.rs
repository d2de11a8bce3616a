//! Worker offload for the expensive initial pass.
//!
//! The surrounding application is single-threaded-GUI-with-worker-offload:
//! graph construction plus the first clustering/layout run is dispatched to
//! a fixed-size pool as a cancellable, progress-reporting task. Cancellation
//! is cooperative, polled between logical units of work; a cancelled task
//! posts no further progress and its pending result is discarded rather than
//! surfaced as an error. There are no timeouts.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Cooperative context handed to a running task.
pub struct TaskContext {
    stop: Arc<AtomicBool>,
    progress: Sender<f32>,
}

impl TaskContext {
    /// True once the task has been cancelled. Poll between logical units of
    /// work and return early when set; the result is discarded anyway.
    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Post a progress fraction in `[0, 1]`. Silently dropped once the task
    /// is cancelled or the handle is gone.
    pub fn report_progress(&self, fraction: f32) {
        if !self.is_cancelled() {
            let _ = self.progress.send(fraction.clamp(0.0, 1.0));
        }
    }
}

/// Handle to a dispatched task.
pub struct TaskHandle<T> {
    stop: Arc<AtomicBool>,
    progress: Receiver<f32>,
    result: Receiver<Option<T>>,
}

impl<T> TaskHandle<T> {
    /// Request cooperative cancellation.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Latest reported progress fraction, if any report arrived since the
    /// last call.
    pub fn latest_progress(&self) -> Option<f32> {
        self.progress.try_iter().last()
    }

    /// Non-blocking poll for the outcome. `None` while still running;
    /// `Some(None)` when the task was cancelled and its result discarded.
    pub fn try_result(&self) -> Option<Option<T>> {
        match self.result.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(None),
        }
    }

    /// Block until the task finishes. `None` when it was cancelled.
    pub fn wait(self) -> Option<T> {
        self.result.recv().unwrap_or(None)
    }
}

/// Fixed-size worker thread pool.
///
/// Workers take jobs from a shared channel; dropping the pool closes the
/// channel and joins every worker after it finishes its current job.
pub struct WorkerPool {
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Create a pool with an explicit worker count.
    ///
    /// # Panics
    /// Panics when `size` is zero.
    pub fn new(size: usize) -> Self {
        assert!(size >= 1, "worker pool needs at least one worker");
        let (jobs, job_rx) = unbounded::<Job>();
        let workers = (0..size)
            .map(|index| {
                let job_rx = job_rx.clone();
                std::thread::Builder::new()
                    .name(format!("kernel-worker-{index}"))
                    .spawn(move || {
                        while let Ok(job) = job_rx.recv() {
                            job();
                        }
                        tracing::trace!(worker = index, "worker shutting down");
                    })
                    .expect("failed to spawn worker thread")
            })
            .collect();
        Self {
            jobs: Some(jobs),
            workers,
        }
    }

    /// Create a pool sized to the hardware concurrency.
    pub fn with_default_size() -> Self {
        Self::new(num_cpus::get().max(1))
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Dispatch a task and return its handle.
    ///
    /// The task runs to completion even when cancelled mid-way (cooperative
    /// early return is up to the closure); a completion observed after
    /// cancellation posts a discarded (`None`) outcome.
    pub fn spawn<T, F>(&self, task: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&TaskContext) -> T + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let (progress_tx, progress_rx) = unbounded();
        let (result_tx, result_rx) = bounded(1);

        let context = TaskContext {
            stop: Arc::clone(&stop),
            progress: progress_tx,
        };
        let job: Job = Box::new(move || {
            let output = task(&context);
            let outcome = if context.is_cancelled() {
                tracing::trace!("task cancelled, discarding result");
                None
            } else {
                Some(output)
            };
            let _ = result_tx.send(outcome);
        });

        self.jobs
            .as_ref()
            .expect("pool sender lives until drop")
            .send(job)
            .expect("worker pool has shut down");

        TaskHandle {
            stop,
            progress: progress_rx,
            result: result_rx,
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.jobs.take(); // close the channel so workers drain and exit
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
