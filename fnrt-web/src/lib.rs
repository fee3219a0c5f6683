//! # fnrt web utilities
//!
//! Request-level building blocks shared by the runtime's HTTP surface:
//! the authentication gate that guards private functions, the permissive
//! CORS headers stamped on every answer, and the plain-text wire error
//! every failed stage turns into.

pub mod errors;
pub mod middleware;

// Re-export commonly used types and functions
pub use errors::{WebError, WebResult};
pub use middleware::{
    cors_layer, ApplicationClaim, AuthError, AuthGate, Claims, ClaimsViolation, CorsLayer, Credential,
    LEGACY_TOKEN_HEADER, TOKEN_HEADER,
};
