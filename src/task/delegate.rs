//! Caller-supplied behaviour of a task.

use super::context::TaskContext;
use std::fmt;

/// What a task does and how it reacts to each outcome.
///
/// `on_pre_execute` runs on the thread that calls [`Task::run`](super::Task::run).
/// [`do_in_background`](Self::do_in_background) runs on the executor, followed
/// on the same thread by exactly one of `on_post_execute` / `on_cancelled`,
/// unless the computation failed.
pub trait Delegate<T>: Send + 'static {
    fn do_in_background(&mut self, ctx: &TaskContext) -> anyhow::Result<T>;

    fn on_pre_execute(&mut self) {}

    /// Not invoked if the task was cancelled before the outcome was finalised.
    fn on_post_execute(&mut self, _result: &T) {}

    /// `result` holds whatever the computation produced, if it got that far.
    fn on_cancelled(&mut self, _result: Option<&T>) {}
}

impl<T, D: Delegate<T> + ?Sized> Delegate<T> for Box<D> {
    fn do_in_background(&mut self, ctx: &TaskContext) -> anyhow::Result<T> {
        (**self).do_in_background(ctx)
    }

    fn on_pre_execute(&mut self) {
        (**self).on_pre_execute()
    }

    fn on_post_execute(&mut self, result: &T) {
        (**self).on_post_execute(result)
    }

    fn on_cancelled(&mut self, result: Option<&T>) {
        (**self).on_cancelled(result)
    }
}

/// Delegate made from a single closure; every hook is a no-op.
pub struct FnDelegate<F> {
    f: F,
}

impl<F> FnDelegate<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<T, F> Delegate<T> for FnDelegate<F>
where
    F: FnMut(&TaskContext) -> anyhow::Result<T> + Send + 'static,
{
    fn do_in_background(&mut self, ctx: &TaskContext) -> anyhow::Result<T> {
        (self.f)(ctx)
    }
}

impl<F> fmt::Debug for FnDelegate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnDelegate").finish_non_exhaustive()
    }
}
