pub use crate::error::{Error, Result};
pub use crate::executor::{Executor, FailureStrategy, InlineExecutor, Job, ManualExecutor};
pub use crate::task::{Delegate, FnDelegate, Observer, Task, TaskContext, TaskId, TaskState};
