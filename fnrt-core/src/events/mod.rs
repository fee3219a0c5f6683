//! Trigger resolution and event normalisation

pub mod http;

pub use self::http::{HttpEvent, HttpRequestContext};

use serde::Serialize;

use crate::context::ExecutionContext;
use crate::error::TriggerError;
use fnrt_config::FunctionConfig;

/// Protocol that produced an inbound invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerType {
    Http,
    Mqtt,
}

/// Trigger types accepted from the trigger header.
///
/// HTTP is deliberately absent: it is the implicit default for an empty
/// header and is never looked up here.
pub const SUPPORTED_TRIGGER_TYPES: &[TriggerType] = &[TriggerType::Mqtt];

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Http => "http",
            TriggerType::Mqtt => "mqtt",
        }
    }

    /// Whether the caller waits for the handler's answer
    pub fn expects_response(&self) -> bool {
        matches!(self, TriggerType::Http)
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical event handed to the handler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TriggerEvent {
    /// Request/response trigger, normalised into a gateway-style event
    Http(HttpEvent),
    /// Body of a trigger whose event source already formatted the event
    Opaque(String),
}

/// Resolves triggers and normalises requests into [`TriggerEvent`]s
#[derive(Debug, Clone)]
pub struct EventFormatter {
    context: ExecutionContext,
}

impl EventFormatter {
    pub fn new(function: &FunctionConfig) -> Self {
        Self {
            context: ExecutionContext::from_config(function),
        }
    }

    /// Map the trigger header value to a trigger type
    pub fn resolve_trigger_type(header_value: &str) -> Result<TriggerType, TriggerError> {
        if header_value.is_empty() {
            return Ok(TriggerType::Http);
        }

        SUPPORTED_TRIGGER_TYPES
            .iter()
            .copied()
            .find(|trigger| trigger.as_str() == header_value)
            .ok_or_else(|| TriggerError::Unsupported(header_value.to_string()))
    }

    /// Build the event for an already-buffered request
    pub fn format_event(
        &self,
        parts: &::http::request::Parts,
        body: &[u8],
        trigger: TriggerType,
    ) -> TriggerEvent {
        match trigger {
            TriggerType::Http => TriggerEvent::Http(HttpEvent::from_request(parts, body)),
            _ => TriggerEvent::Opaque(String::from_utf8_lossy(body).into_owned()),
        }
    }

    /// Context snapshot built at startup; identical for every request
    pub fn execution_context(&self) -> ExecutionContext {
        self.context.clone()
    }
}
