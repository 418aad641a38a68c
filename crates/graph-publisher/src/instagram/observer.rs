use super::PublishStage;
use crate::prelude::*;
use crate::Error;

/// Receives the diagnostics about the failed publishing attempts.
/// It is called right before the error is returned to the caller.
pub trait PublishObserver: Send + Sync {
    fn on_failure(&self, stage: PublishStage, err: &Error);
}

/// Default observer that writes the failures to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PublishObserver for TracingObserver {
    fn on_failure(&self, stage: PublishStage, err: &Error) {
        error!(%stage, err = tracing_err(err), "Error publishing to Instagram");
    }
}
