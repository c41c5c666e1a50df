//! bgtask - single-shot background tasks
//!
//! Runs one unit of work off the caller's thread, exactly once, and tells
//! interested parties what happened: a pre-execute hook on the caller, then
//! exactly one of a post-execute or cancelled hook, then completion observers.
//!
//! # Quick Start
//!
//! ```
//! use bgtask::prelude::*;
//! use std::sync::mpsc;
//! use std::thread;
//! use std::time::Duration;
//!
//! // executors are supplied by the caller; this one spawns a thread per job
//! struct Spawn;
//!
//! impl Executor for Spawn {
//!     fn execute(&self, job: Job) -> Result<()> {
//!         thread::spawn(job);
//!         Ok(())
//!     }
//! }
//!
//! let (tx, rx) = mpsc::channel();
//!
//! let task = Task::from_fn(|ctx| {
//!     ctx.sleep(Duration::from_millis(10))?;
//!     Ok(42)
//! })
//! .with_observer(move |result: Option<&i32>| {
//!     tx.send(result.copied()).unwrap();
//! });
//!
//! task.run(&Spawn).unwrap();
//! assert_eq!(rx.recv().unwrap(), Some(42));
//! assert_eq!(task.state(), TaskState::Finished);
//! ```
//!
//! # Features
//!
//! - **Exactly-once execution**: a task runs at most once per initialization
//! - **Cooperative cancellation**: cancel before start and the work never runs
//! - **Lifecycle hooks**: pre-execute, post-execute and cancelled callbacks
//! - **Observers**: completion notification without polling
//! - **Pluggable executors**: bring your own, or use the inline and manual ones

// Lint configuration
#![warn(missing_debug_implementations)]

pub mod error;
pub mod executor;
pub mod prelude;
pub mod task;

// Re-export key types at crate root
pub use error::{Error, Result};
pub use executor::{Executor, FailureStrategy, InlineExecutor, Job, ManualExecutor};
pub use task::{Delegate, Observer, Task, TaskContext, TaskState};

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_inline_round_trip() {
        let seen = Arc::new(Mutex::new(None));
        let s = seen.clone();

        let task = Task::from_fn(|_| Ok("done".to_string()));
        task.add_observer(move |r: Option<&String>| *s.lock() = r.cloned());
        task.run(&InlineExecutor::new()).unwrap();

        assert_eq!(task.state(), TaskState::Finished);
        assert_eq!(seen.lock().as_deref(), Some("done"));
    }

    #[test]
    fn test_run_twice_is_a_state_violation() {
        let task = Task::from_fn(|_| Ok(1u8));
        let exec = InlineExecutor::new();

        task.run(&exec).unwrap();
        let err = task.run(&exec).unwrap_err();
        assert!(err.is_state_violation());
    }
}
