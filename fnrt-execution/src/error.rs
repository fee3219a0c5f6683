//! Error types for handler execution

use fnrt_resilience::SignalError;
use std::time::Duration;
use thiserror::Error;

/// Handler sub-process lifecycle errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Failed to start handler process '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Handler process has already been started")]
    AlreadyStarted,

    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),
}

/// Failures delivering an invocation to the handler sub-process
#[derive(Error, Debug)]
pub enum InvokeError {
    #[error("Unable to serialize invocation request: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("too many retries, sub-runtime server did not come up in {elapsed:?} ({attempts} attempts)")]
    UpstreamUnavailable { attempts: u32, elapsed: Duration },

    #[error("An error occurred during handler execution: {0}")]
    HandlerExecutionError(String),

    #[error("Transport error: {0}")]
    TransportError(String),
}

impl From<reqwest::Error> for InvokeError {
    fn from(err: reqwest::Error) -> Self {
        Self::TransportError(err.to_string())
    }
}
