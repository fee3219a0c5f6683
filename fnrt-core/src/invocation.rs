use serde::Serialize;

use crate::context::ExecutionContext;
use crate::events::TriggerEvent;

/// Envelope POSTed to the handler sub-process for one invocation
///
/// Carries what the sub-runtime needs to import the handler dynamically
/// along with the event and context it is called with.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationRequest {
    pub event: TriggerEvent,
    pub context: ExecutionContext,
    #[serde(rename = "handlerName")]
    pub handler_name: String,
    #[serde(rename = "handlerPath")]
    pub handler_path: String,
}
