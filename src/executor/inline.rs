use super::{Executor, FailureHandler, FailureStrategy, Job};
use crate::error::Result;
use std::sync::Arc;

/// Runs every job immediately on the submitting thread.
#[derive(Debug, Clone, Default)]
pub struct InlineExecutor {
    failures: Arc<FailureHandler>,
}

impl InlineExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: FailureStrategy) -> Self {
        Self {
            failures: Arc::new(FailureHandler::new(strategy)),
        }
    }

    pub fn failures(&self) -> &FailureHandler {
        &self.failures
    }
}

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) -> Result<()> {
        self.failures.run(job);
        Ok(())
    }
}
