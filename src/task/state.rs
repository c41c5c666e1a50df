//! Lifecycle state of a task.

use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a [`Task`](super::Task). Each state is entered at most
/// once per initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Constructed or re-initialized, not yet handed to an executor.
    NotStarted = 0,
    /// Handed to an executor; the terminal transition has not happened yet.
    Running = 1,
    /// Terminal. Hooks and observers have been (or are being) driven.
    Finished = 2,
}

impl TaskState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => TaskState::NotStarted,
            1 => TaskState::Running,
            _ => TaskState::Finished,
        }
    }
}

impl Default for TaskState {
    fn default() -> Self {
        TaskState::NotStarted
    }
}

#[derive(Debug, Default)]
pub(crate) struct AtomicState {
    bits: AtomicU8,
}

impl AtomicState {
    pub fn load(&self) -> TaskState {
        TaskState::from_u8(self.bits.load(Ordering::Acquire))
    }

    /// Moves `from -> to`, returning the observed state on failure.
    pub fn transition(&self, from: TaskState, to: TaskState) -> Result<(), TaskState> {
        self.bits
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(TaskState::from_u8)
    }

    /// Back to `NotStarted` from anything but `Running`.
    pub fn reset(&self) -> Result<(), TaskState> {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            if current == TaskState::Running as u8 {
                return Err(TaskState::Running);
            }
            match self.bits.compare_exchange_weak(
                current,
                TaskState::NotStarted as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        let state = AtomicState::default();
        assert_eq!(state.load(), TaskState::NotStarted);

        state.transition(TaskState::NotStarted, TaskState::Running).unwrap();
        assert_eq!(state.load(), TaskState::Running);

        assert_eq!(
            state.transition(TaskState::NotStarted, TaskState::Running),
            Err(TaskState::Running)
        );

        state.transition(TaskState::Running, TaskState::Finished).unwrap();
        assert_eq!(state.load(), TaskState::Finished);
    }

    #[test]
    fn test_reset_refused_while_running() {
        let state = AtomicState::default();
        state.transition(TaskState::NotStarted, TaskState::Running).unwrap();
        assert_eq!(state.reset(), Err(TaskState::Running));

        state.transition(TaskState::Running, TaskState::Finished).unwrap();
        assert!(state.reset().is_ok());
        assert_eq!(state.load(), TaskState::NotStarted);
    }
}
