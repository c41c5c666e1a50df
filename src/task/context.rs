//! Cooperative cancellation view handed to the background computation.

use super::flags::TaskFlags;
use crate::error::{Error, Result};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Handle given to [`Delegate::do_in_background`](super::Delegate::do_in_background).
///
/// Cancellation is a flag, not a stop signal: long computations should poll
/// [`is_cancelled`](Self::is_cancelled) or use the interruptible waits below,
/// which return [`Error::Interrupted`] once `cancel(true)` has been called.
#[derive(Debug, Clone)]
pub struct TaskContext {
    flags: Arc<TaskFlags>,
}

impl TaskContext {
    pub(crate) fn new(flags: Arc<TaskFlags>) -> Self {
        Self { flags }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flags.is_cancelled()
    }

    pub fn is_interrupted(&self) -> bool {
        self.flags.is_interrupted()
    }

    /// Fails with [`Error::Interrupted`] if an interrupting cancel was requested.
    pub fn check(&self) -> Result<()> {
        if self.flags.is_interrupted() {
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Sleeps for `duration` unless interrupted first.
    pub fn sleep(&self, duration: Duration) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            self.check()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            thread::park_timeout(deadline - now);
        }
    }

    /// Blocks until interrupted. Always returns [`Error::Interrupted`].
    pub fn park(&self) -> Result<()> {
        loop {
            self.check()?;
            thread::park();
        }
    }
}
