//! Core domain types for the fnrt function runtime
//!
//! This crate turns an inbound trigger into the canonical event/context
//! pair handed to the handler sub-process, and turns whatever the handler
//! answers back into a structured response. It has no I/O of its own.

pub mod context;
pub mod error;
pub mod events;
pub mod invocation;
pub mod response;

// Re-export commonly used types at the crate root
pub use context::ExecutionContext;
pub use error::{FormatError, ResponseError, TriggerError};
pub use events::{EventFormatter, HttpEvent, TriggerEvent, TriggerType};
pub use invocation::InvocationRequest;
pub use response::{InvocationResponse, ResponseBody};
