//! fnrt bootstrap server
//!
//! Listens for triggered invocations, runs each one through the request
//! pipeline and keeps the handler sub-process alive for the lifetime of
//! the server.

pub mod pipeline;
pub mod startup;

pub use pipeline::{build_router, handle_invocation, AppState, TRIGGER_TYPE_HEADER};
pub use startup::Server;
