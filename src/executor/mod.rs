//! Executors that run the jobs submitted by [`Task::run`](crate::Task::run).
//!
//! The task core only consumes the [`Executor`] trait. Thread pools and
//! schedulers belong to the caller; the two executors here cover running on
//! the caller ([`InlineExecutor`]) and running when the owner decides
//! ([`ManualExecutor`]).

pub mod failure;
pub mod inline;
pub mod manual;

pub use failure::{FailureHandler, FailureInfo, FailureKind, FailureStrategy};
pub use inline::InlineExecutor;
pub use manual::ManualExecutor;

use crate::error::Result;
use std::sync::Arc;

/// A zero-argument unit of work. An `Err` is a failure surfaced to whoever
/// supervises the executor.
pub type Job = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

/// Runs submitted jobs on some thread at some later time.
///
/// `execute` returns `Err` only when the job was not accepted; a rejected job
/// is dropped without running.
pub trait Executor: Send + Sync {
    fn execute(&self, job: Job) -> Result<()>;
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, job: Job) -> Result<()> {
        (**self).execute(job)
    }
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, job: Job) -> Result<()> {
        (**self).execute(job)
    }
}
