//! Cancellation and invocation guards shared between the caller and the
//! executing thread.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, Thread};

#[derive(Debug, Default)]
pub(crate) struct TaskFlags {
    cancelled: AtomicBool,
    invoked: AtomicBool,
    interrupted: AtomicBool,
    // Thread currently inside the computation, unparked on interrupt.
    runner: Mutex<Option<Thread>>,
}

impl TaskFlags {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn set_cancelled(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_invoked(&self) -> bool {
        self.invoked.load(Ordering::Acquire)
    }

    /// Marks the computation as invoked. Returns the previous value.
    pub fn mark_invoked(&self) -> bool {
        self.invoked.swap(true, Ordering::AcqRel)
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Acquire)
    }

    /// Raises the interrupt flag and wakes the runner if it is parked.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
        if let Some(runner) = self.runner.lock().as_ref() {
            runner.unpark();
        }
    }

    pub fn bind_runner(&self) {
        *self.runner.lock() = Some(thread::current());
    }

    pub fn unbind_runner(&self) {
        self.runner.lock().take();
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
        self.invoked.store(false, Ordering::Release);
        self.interrupted.store(false, Ordering::Release);
        self.runner.lock().take();
    }
}
