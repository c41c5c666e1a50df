//! Caller-side executor used by the integration tests: a fixed set of named
//! worker threads pulling jobs from a shared injector queue.

#![allow(dead_code)]

use bgtask::executor::{FailureHandler, FailureStrategy};
use bgtask::{Error, Executor, Job, Result};
use crossbeam_deque::{Injector, Steal};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct WorkerPool {
    injector: Arc<Injector<Job>>,
    failures: Arc<FailureHandler>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
    next_wake: AtomicUsize,
}

impl WorkerPool {
    pub fn new(num_threads: usize) -> Self {
        Self::with_strategy(num_threads, FailureStrategy::LogAndContinue)
    }

    pub fn with_strategy(num_threads: usize, strategy: FailureStrategy) -> Self {
        let injector = Arc::new(Injector::new());
        let failures = Arc::new(FailureHandler::new(strategy));
        let shutdown = Arc::new(AtomicBool::new(false));

        let workers = (0..num_threads)
            .map(|id| {
                let injector = injector.clone();
                let failures = failures.clone();
                let shutdown = shutdown.clone();
                thread::Builder::new()
                    .name(format!("test-worker-{}", id))
                    .spawn(move || worker_loop(&injector, &failures, &shutdown))
                    .expect("spawn test worker")
            })
            .collect();

        Self {
            injector,
            failures,
            shutdown,
            workers,
            next_wake: AtomicUsize::new(0),
        }
    }

    pub fn failures(&self) -> &FailureHandler {
        &self.failures
    }
}

fn worker_loop(injector: &Injector<Job>, failures: &FailureHandler, shutdown: &AtomicBool) {
    let mut idle = 0u32;
    while !shutdown.load(Ordering::Acquire) {
        match injector.steal() {
            Steal::Success(job) => {
                idle = 0;
                failures.run(job);
            }
            Steal::Retry => continue,
            Steal::Empty => {
                idle += 1;
                if idle <= 10 {
                    thread::yield_now();
                } else {
                    thread::park_timeout(Duration::from_millis(1));
                }
            }
        }
    }
}

impl Executor for WorkerPool {
    fn execute(&self, job: Job) -> Result<()> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(Error::rejected("worker pool is shut down"));
        }
        self.injector.push(job);

        // Wake up a worker
        let idx = self.next_wake.fetch_add(1, Ordering::Relaxed) % self.workers.len();
        self.workers[idx].thread().unpark();
        Ok(())
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        for worker in self.workers.drain(..) {
            worker.thread().unpark();
            let _ = worker.join();
        }
        // queued jobs are dropped unrun, which finishes their tasks as cancelled
        loop {
            match self.injector.steal() {
                Steal::Success(job) => drop(job),
                Steal::Retry => continue,
                Steal::Empty => break,
            }
        }
    }
}
