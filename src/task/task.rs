//! Task lifecycle controller.

use super::delegate::{Delegate, FnDelegate};
use super::flags::TaskFlags;
use super::observer::{Observer, ObserverRegistry};
use super::state::{AtomicState, TaskState};
use super::context::TaskContext;
use super::wrapper::{BackgroundWork, RunCell};
use crate::error::{Error, Result};
use crate::executor::failure::panic_message;
use crate::executor::Executor;
use parking_lot::Mutex;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

pub(crate) struct TaskInner<T> {
    pub(crate) id: TaskId,
    pub(crate) state: AtomicState,
    pub(crate) flags: Arc<TaskFlags>,
    pub(crate) cell: RunCell,
    pub(crate) delegate: Mutex<Box<dyn Delegate<T>>>,
    pub(crate) observers: ObserverRegistry<T>,
}

impl<T: Send + 'static> TaskInner<T> {
    /// Delivers a computed value, or `None` for an interrupted computation.
    pub(crate) fn finish(&self, value: Option<T>) -> Result<()> {
        let sealed = value.is_some() && self.cell.complete();
        let hook_panic = {
            let mut delegate = self.delegate.lock();
            match &value {
                Some(v) if sealed => invoke_hook(|| delegate.on_post_execute(v)),
                other => invoke_hook(|| delegate.on_cancelled(other.as_ref())),
            }
        };
        self.terminate(value.as_ref());
        match hook_panic {
            Some(message) => Err(Error::Panicked(message)),
            None => Ok(()),
        }
    }

    /// Terminal transition for a failed computation; no hook fires.
    pub(crate) fn finish_failed(&self) {
        self.terminate(None);
    }

    pub(crate) fn post_result_if_not_invoked(&self) {
        if self.flags.is_invoked() {
            return;
        }
        let hook_panic = invoke_hook(|| self.delegate.lock().on_cancelled(None));
        if let Some(message) = hook_panic {
            tracing::error!(task = ?self.id, panic = %message, "on_cancelled panicked");
        }
        self.terminate(None);
    }

    fn terminate(&self, result: Option<&T>) {
        // sealed before the transition: once Finished is visible the task may
        // be re-initialized with a fresh observer list
        let observers = self.observers.seal();
        if let Err(state) = self.state.transition(TaskState::Running, TaskState::Finished) {
            tracing::warn!(task = ?self.id, ?state, "terminal transition from unexpected state");
        }
        let notified = ObserverRegistry::deliver(&observers, result);
        tracing::debug!(
            task = ?self.id,
            cancelled = self.flags.is_cancelled(),
            observers = notified,
            "task finished"
        );
    }
}

fn invoke_hook<F: FnOnce()>(hook: F) -> Option<String> {
    catch_unwind(AssertUnwindSafe(hook))
        .err()
        .map(|payload| panic_message(payload.as_ref()))
}

/// A single-use unit of background work with an explicit lifecycle.
///
/// `Task` is a cheap handle: clones share the same state, so one clone can be
/// handed to other threads to query or cancel while another drives `run`.
///
/// ```
/// use bgtask::{InlineExecutor, Task, TaskState};
///
/// let task = Task::from_fn(|_| Ok(6 * 7));
/// task.add_observer(|r: Option<&i32>| assert_eq!(r, Some(&42)));
/// task.run(&InlineExecutor::new()).unwrap();
/// assert_eq!(task.state(), TaskState::Finished);
/// ```
pub struct Task<T> {
    inner: Arc<TaskInner<T>>,
}

impl<T: Send + 'static> Task<T> {
    pub fn new<D: Delegate<T>>(delegate: D) -> Self {
        Task {
            inner: Arc::new(TaskInner {
                id: TaskId::next(),
                state: AtomicState::default(),
                flags: Arc::new(TaskFlags::default()),
                cell: RunCell::new(),
                delegate: Mutex::new(Box::new(delegate)),
                observers: ObserverRegistry::new(),
            }),
        }
    }

    /// Task whose only behaviour is the computation itself.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(&TaskContext) -> anyhow::Result<T> + Send + 'static,
    {
        Self::new(FnDelegate::new(f))
    }

    /// Replaces the delegate and clears flags and observers so the task can be
    /// run again. Refused while the task is running.
    pub fn initialize<D: Delegate<T>>(&self, delegate: D) -> Result<()> {
        if self.inner.state.load() == TaskState::Running {
            return Err(Error::illegal_state(
                TaskState::Running,
                "cannot initialize task: the task is still running",
            ));
        }

        let mut slot = self.inner.delegate.lock();
        self.inner.state.reset().map_err(|state| {
            Error::illegal_state(state, "cannot initialize task: the task is still running")
        })?;
        *slot = Box::new(delegate);
        self.inner.flags.reset();
        self.inner.cell.reset();
        self.inner.observers.reset();

        tracing::debug!(task = ?self.inner.id, "task initialized");
        Ok(())
    }

    /// Chaining form of [`initialize`](Self::initialize).
    pub fn reinitialize<D: Delegate<T>>(&self, delegate: D) -> Result<&Self> {
        self.initialize(delegate)?;
        Ok(self)
    }

    /// Runs `on_pre_execute` on this thread, then hands the computation to
    /// `executor`. Returns as soon as the executor accepted the job.
    pub fn run<E: Executor + ?Sized>(&self, executor: &E) -> Result<()> {
        if let Err(state) = self
            .inner
            .state
            .transition(TaskState::NotStarted, TaskState::Running)
        {
            let reason = match state {
                TaskState::Running => "cannot execute task: the task is already running",
                _ => {
                    "cannot execute task: the task has already been executed \
                     (a task can be executed only once)"
                }
            };
            return Err(Error::illegal_state(state, reason));
        }

        self.inner.delegate.lock().on_pre_execute();
        tracing::debug!(task = ?self.inner.id, "submitting task");

        let job = BackgroundWork::new(self.inner.clone()).into_job();
        if let Err(err) = executor.execute(job) {
            // the dropped job has already finished the task as cancelled
            tracing::warn!(task = ?self.inner.id, error = %err, "executor rejected task");
            return Err(err);
        }
        Ok(())
    }

    /// Requests cancellation. Never blocks.
    ///
    /// Before the computation starts this guarantees it never runs. While it
    /// runs, `may_interrupt_if_running` additionally wakes interruptible waits
    /// on [`TaskContext`]. Returns `false` if the outcome was already sealed.
    pub fn cancel(&self, may_interrupt_if_running: bool) -> bool {
        self.inner.flags.set_cancelled();
        let effective = self.inner.cell.cancel();
        if effective && may_interrupt_if_running {
            self.inner.flags.interrupt();
        }
        tracing::debug!(
            task = ?self.inner.id,
            effective,
            interrupt = may_interrupt_if_running,
            "cancel requested"
        );
        effective
    }

    /// Registers an observer for the terminal result. Observers added after
    /// notification are never called.
    pub fn add_observer<O: Observer<T>>(&self, observer: O) {
        self.register(Arc::new(observer));
    }

    pub fn add_observers<I>(&self, observers: I)
    where
        I: IntoIterator<Item = Arc<dyn Observer<T>>>,
    {
        for observer in observers {
            self.register(observer);
        }
    }

    fn register(&self, observer: Arc<dyn Observer<T>>) {
        if !self.inner.observers.add(observer) {
            tracing::debug!(task = ?self.inner.id, "observer registered after notification");
        }
    }

    pub fn with_observer<O: Observer<T>>(self, observer: O) -> Self {
        self.add_observer(observer);
        self
    }
}

impl<T> Task<T> {
    pub fn id(&self) -> TaskId {
        self.inner.id
    }

    pub fn state(&self) -> TaskState {
        self.inner.state.load()
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.flags.is_cancelled()
    }

    /// True once the computation has been entered for the current initialization.
    pub fn is_invoked(&self) -> bool {
        self.inner.flags.is_invoked()
    }
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Task {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.inner.id)
            .field("state", &self.inner.state.load())
            .field("cancelled", &self.inner.flags.is_cancelled())
            .field("invoked", &self.inner.flags.is_invoked())
            .field("observers", &self.inner.observers)
            .finish()
    }
}
