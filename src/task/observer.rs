//! Completion observers.

use crate::executor::failure::panic_message;
use parking_lot::Mutex;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Notified once with the terminal result of a task, or `None` if the task
/// finished without producing one (cancelled before running, or failed).
pub trait Observer<T>: Send + Sync + 'static {
    fn update(&self, result: Option<&T>);
}

impl<T, F> Observer<T> for F
where
    F: Fn(Option<&T>) + Send + Sync + 'static,
{
    fn update(&self, result: Option<&T>) {
        self(result)
    }
}

struct Registry<T> {
    observers: Vec<Arc<dyn Observer<T>>>,
    notified: bool,
}

/// Insertion-ordered observer list that fires at most once per reset.
pub(crate) struct ObserverRegistry<T> {
    inner: Mutex<Registry<T>>,
}

impl<T: 'static> ObserverRegistry<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Registry {
                observers: Vec::new(),
                notified: false,
            }),
        }
    }

    /// Returns false if notification already happened; the observer is dropped.
    pub fn add(&self, observer: Arc<dyn Observer<T>>) -> bool {
        let mut inner = self.inner.lock();
        if inner.notified {
            return false;
        }
        inner.observers.push(observer);
        true
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().observers.len()
    }

    /// Drives every registered observer in order. Returns how many ran.
    #[cfg(test)]
    pub fn notify(&self, result: Option<&T>) -> usize {
        Self::deliver(&self.seal(), result)
    }

    /// Closes registration and hands back the observers to notify. Empty if
    /// the registry was already sealed.
    pub fn seal(&self) -> Vec<Arc<dyn Observer<T>>> {
        let mut inner = self.inner.lock();
        if inner.notified {
            return Vec::new();
        }
        inner.notified = true;
        std::mem::take(&mut inner.observers)
    }

    pub fn deliver(observers: &[Arc<dyn Observer<T>>], result: Option<&T>) -> usize {
        for (idx, observer) in observers.iter().enumerate() {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| observer.update(result))) {
                tracing::warn!(
                    observer = idx,
                    panic = %panic_message(payload.as_ref()),
                    "task observer panicked"
                );
            }
        }
        observers.len()
    }

    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.observers.clear();
        inner.notified = false;
    }
}

impl<T> fmt::Debug for ObserverRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ObserverRegistry")
            .field("observers", &inner.observers.len())
            .field("notified", &inner.notified)
            .finish()
    }
}
