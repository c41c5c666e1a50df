use crate::task::TaskState;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("illegal task state {state:?}: {reason}")]
    IllegalState {
        state: TaskState,
        reason: &'static str,
    },

    #[error("job rejected by executor: {0}")]
    Rejected(String),

    #[error("an error occurred while executing the background computation")]
    Failed(#[source] anyhow::Error),

    #[error("background computation panicked: {0}")]
    Panicked(String),

    #[error("task interrupted")]
    Interrupted,

    #[error("executor error: {0}")]
    Executor(String),
}

impl Error {
    pub fn illegal_state(state: TaskState, reason: &'static str) -> Self {
        Error::IllegalState { state, reason }
    }

    pub fn rejected<S: Into<String>>(msg: S) -> Self {
        Error::Rejected(msg.into())
    }

    pub fn executor<S: Into<String>>(msg: S) -> Self {
        Error::Executor(msg.into())
    }

    /// True for errors reported synchronously by `Task::run`/`Task::initialize`.
    pub fn is_state_violation(&self) -> bool {
        matches!(self, Error::IllegalState { .. })
    }

    /// True if `err` is the cooperative interruption raised by a `TaskContext`.
    pub(crate) fn is_interruption(err: &anyhow::Error) -> bool {
        matches!(err.downcast_ref::<Error>(), Some(Error::Interrupted))
    }
}
