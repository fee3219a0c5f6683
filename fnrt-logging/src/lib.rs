//! Structured logging for the fnrt runtime
//!
//! All crates log through `tracing` (or the `log` facade, which the
//! subscriber bridges). Child process output is not routed through here;
//! it is forwarded verbatim by the supervisor.

pub mod init;

pub use init::{build_env_filter, init_logging};
