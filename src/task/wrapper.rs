//! Wraps the computation so exactly one terminal outcome is delivered.

use super::context::TaskContext;
use super::task::TaskInner;
use crate::error::{Error, Result};
use crate::executor::failure::panic_message;
use crate::executor::Job;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const NEW: u8 = 0;
const STARTED: u8 = 1;
const COMPLETED: u8 = 2;
const CANCELLED: u8 = 3;
const CANCELLED_RUNNING: u8 = 4;

/// Progress of one submission of the wrapper.
#[derive(Debug)]
pub(crate) struct RunCell {
    state: AtomicU8,
}

impl RunCell {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(NEW),
        }
    }

    /// Claims the right to invoke the computation.
    pub fn start(&self) -> bool {
        self.state
            .compare_exchange(NEW, STARTED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Seals a normal result. False if a cancel got in first.
    pub fn complete(&self) -> bool {
        self.state
            .compare_exchange(STARTED, COMPLETED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// False once a result has been sealed; cancellation can no longer
    /// change the outcome.
    pub fn cancel(&self) -> bool {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let next = match current {
                NEW => CANCELLED,
                STARTED => CANCELLED_RUNNING,
                CANCELLED | CANCELLED_RUNNING => return true,
                _ => return false,
            };
            match self
                .state
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    pub fn is_abandoned(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    pub fn reset(&self) {
        self.state.store(NEW, Ordering::Release);
    }
}

/// The unit of work handed to the executor for one `Task::run`.
///
/// A job the executor drops without running counts as abandoned work and is
/// finished through the same fallback as a cancel-before-start.
pub(crate) struct BackgroundWork<T: Send + 'static> {
    inner: Arc<TaskInner<T>>,
    ran: bool,
}

impl<T: Send + 'static> BackgroundWork<T> {
    pub fn new(inner: Arc<TaskInner<T>>) -> Self {
        Self { inner, ran: false }
    }

    pub fn into_job(self) -> Job {
        Box::new(move || self.run())
    }

    pub fn run(mut self) -> Result<()> {
        self.ran = true;
        if self.inner.cell.start() {
            // the outcome is delivered inside call(); once Finished is visible
            // the task may already belong to a newer initialization
            return self.call();
        }
        tracing::debug!(task = ?self.inner.id, "computation abandoned before start");
        self.done();
        Ok(())
    }

    fn call(&self) -> Result<()> {
        let inner = &self.inner;
        inner.flags.mark_invoked();
        inner.flags.bind_runner();

        let ctx = TaskContext::new(inner.flags.clone());
        let outcome = {
            let mut delegate = inner.delegate.lock();
            catch_unwind(AssertUnwindSafe(|| delegate.do_in_background(&ctx)))
        };
        inner.flags.unbind_runner();

        match outcome {
            Ok(Ok(value)) => inner.finish(Some(value)),
            Ok(Err(err)) if Error::is_interruption(&err) && inner.flags.is_cancelled() => {
                // interrupted waits are not failures
                tracing::debug!(task = ?inner.id, "computation interrupted by cancel");
                inner.finish(None)
            }
            Ok(Err(err)) => {
                tracing::error!(task = ?inner.id, error = %err, "background computation failed");
                inner.finish_failed();
                Err(Error::Failed(err))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(task = ?inner.id, panic = %message, "background computation panicked");
                inner.finish_failed();
                Err(Error::Panicked(message))
            }
        }
    }

    /// Fallback for work that never reached the computation.
    fn done(&self) {
        self.inner.post_result_if_not_invoked();
    }
}

impl<T: Send + 'static> Drop for BackgroundWork<T> {
    fn drop(&mut self) {
        if self.ran {
            return;
        }
        tracing::debug!(task = ?self.inner.id, "job dropped before running");
        self.inner.flags.set_cancelled();
        self.inner.cell.cancel();
        self.inner.post_result_if_not_invoked();
    }
}
