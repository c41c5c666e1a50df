use super::{Executor, FailureHandler, FailureStrategy, Job};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Queues jobs until the owner runs them, in submission order.
///
/// Useful for event loops that want to drain work at a known point, and for
/// deterministic tests that need to act between submission and execution.
pub struct ManualExecutor {
    queue: Mutex<VecDeque<Job>>,
    closed: AtomicBool,
    failures: FailureHandler,
}

impl ManualExecutor {
    pub fn new() -> Self {
        Self::with_strategy(FailureStrategy::default())
    }

    pub fn with_strategy(strategy: FailureStrategy) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            closed: AtomicBool::new(false),
            failures: FailureHandler::new(strategy),
        }
    }

    /// Runs the oldest queued job on this thread. False if the queue was empty.
    pub fn run_next(&self) -> bool {
        // lock released before the job runs; jobs may submit more work
        let job = self.queue.lock().pop_front();
        match job {
            Some(job) => {
                self.failures.run(job);
                true
            }
            None => false,
        }
    }

    /// Runs jobs until the queue is empty, including ones queued meanwhile.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Rejects further submissions and drops queued jobs without running them.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let dropped: Vec<Job> = self.queue.lock().drain(..).collect();
        if !dropped.is_empty() {
            tracing::debug!(jobs = dropped.len(), "manual executor dropped queued jobs");
        }
    }

    pub fn failures(&self) -> &FailureHandler {
        &self.failures
    }
}

impl Default for ManualExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for ManualExecutor {
    fn execute(&self, job: Job) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::rejected("manual executor is closed"));
        }
        self.queue.lock().push_back(job);
        Ok(())
    }
}

impl Drop for ManualExecutor {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for ManualExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualExecutor")
            .field("pending", &self.pending())
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .field("failures", &self.failures.failure_count())
            .finish()
    }
}
