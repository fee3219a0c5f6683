//! Error types for event formatting and response translation

use thiserror::Error;

/// The trigger header named a protocol this runtime does not handle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TriggerError {
    #[error("Trigger Type is not supported by this runtime: {0}")]
    Unsupported(String),
}

/// The inbound request could not be turned into an event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unable to read request body: {0}")]
    BodyRead(String),

    #[error("Request payload too large, max payload size = {0} bytes")]
    PayloadTooLarge(usize),
}

/// The handler response could not be written to the wire
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    #[error("Handler response declares a base64 body but the body is not a string")]
    Base64BodyNotString,

    #[error("Handler response body is not valid base64: {0}")]
    InvalidBase64Body(String),
}
