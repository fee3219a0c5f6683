//! Handler execution for the fnrt function runtime
//!
//! [`ProcessSupervisor`] owns the single handler sub-process for the
//! lifetime of the server; [`FunctionInvoker`] delivers each invocation
//! to that sub-process over its local HTTP endpoint.

pub mod error;
pub mod invoker;
pub mod process;

// Re-export main types
pub use error::{ExecutionError, InvokeError};
pub use invoker::FunctionInvoker;
pub use process::{ChildExit, ChildState, HandlerCommand, ProcessSupervisor, SupervisorHandle};
