use crate::error::Error;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::Job;

/// What an executor does when a job fails or panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStrategy {
    Abort,
    Isolate,
    LogAndContinue,
}

impl Default for FailureStrategy {
    fn default() -> Self {
        FailureStrategy::LogAndContinue
    }
}

/// Supervises jobs on the executing thread: failures returned by a job and
/// panics escaping it end up here.
#[derive(Debug)]
pub struct FailureHandler {
    strategy: FailureStrategy,
    failure_count: AtomicUsize,
    last_failure: Mutex<Option<FailureInfo>>,
}

impl FailureHandler {
    pub fn new(strategy: FailureStrategy) -> Self {
        Self {
            strategy,
            failure_count: AtomicUsize::new(0),
            last_failure: Mutex::new(None),
        }
    }

    /// Runs `job`, returning the failure if there was one.
    pub fn run(&self, job: Job) -> Option<FailureInfo> {
        let info = match catch_unwind(AssertUnwindSafe(job)) {
            Ok(Ok(())) => return None,
            Ok(Err(err)) => FailureInfo::from_error(&err),
            Err(payload) => FailureInfo {
                message: panic_message(payload.as_ref()),
                kind: FailureKind::Panic,
            },
        };

        self.failure_count.fetch_add(1, Ordering::Relaxed);

        match self.strategy {
            FailureStrategy::Abort => {
                tracing::error!(failure = %info.message, "job failed (abort strategy)");
                std::process::abort();
            }
            FailureStrategy::Isolate => {}
            FailureStrategy::LogAndContinue => {
                tracing::error!(failure = %info.message, kind = ?info.kind, "job failed");
            }
        }

        *self.last_failure.lock() = Some(info.clone());
        Some(info)
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn last_failure(&self) -> Option<FailureInfo> {
        self.last_failure.lock().clone()
    }

    pub fn reset_count(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
        self.last_failure.lock().take();
    }

    pub fn strategy(&self) -> FailureStrategy {
        self.strategy
    }
}

impl Default for FailureHandler {
    fn default() -> Self {
        Self::new(FailureStrategy::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The job returned an error.
    Error,
    /// The job unwound out of the executor.
    Panic,
}

#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub message: String,
    pub kind: FailureKind,
}

impl FailureInfo {
    fn from_error(err: &Error) -> Self {
        // keep the computation's own message, not only the wrapper's
        let message = match err {
            Error::Failed(source) => format!("{}: {:#}", err, source),
            other => other.to_string(),
        };
        Self {
            message,
            kind: FailureKind::Error,
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
