//! Single-shot background tasks.
//!
//! A [`Task`] wraps a [`Delegate`] and moves through
//! `NotStarted -> Running -> Finished` exactly once per initialization:
//!
//! - [`Task::run`] runs `on_pre_execute` on the caller, then submits the
//!   computation to an [`Executor`](crate::executor::Executor).
//! - When the computation returns, exactly one of `on_post_execute` or
//!   `on_cancelled` fires, the task becomes `Finished`, then observers run.
//! - A computation that fails fires no hook; the failure is handed back to
//!   the executor and observers see `None`.

pub mod context;
pub mod delegate;
pub(crate) mod flags;
pub mod observer;
pub mod state;
#[allow(clippy::module_inception)]
pub mod task;
pub(crate) mod wrapper;

pub use context::TaskContext;
pub use delegate::{Delegate, FnDelegate};
pub use observer::Observer;
pub use state::TaskState;
pub use task::{Task, TaskId};
