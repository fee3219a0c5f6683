pub mod auth;
pub mod cors;

pub use auth::{
    ApplicationClaim, AuthError, AuthGate, Claims, ClaimsViolation, Credential, LEGACY_TOKEN_HEADER, TOKEN_HEADER,
};
pub use cors::{cors_layer, CorsLayer};
