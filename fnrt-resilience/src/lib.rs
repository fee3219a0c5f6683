//! Resilience patterns for fnrt
//!
//! Fixed-interval retry used while the handler sub-process cold-starts,
//! and forwarding of termination signals to that sub-process.

pub mod retry;
#[cfg(unix)]
pub mod signals;

// Re-export commonly used types
pub use retry::{RetryError, RetryExecutor, RetryPolicy, Retryable};
#[cfg(unix)]
pub use signals::{forward_signal, wait_for_termination, SignalError, TerminationSignal};
