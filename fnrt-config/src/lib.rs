//! Domain-driven configuration for the fnrt function runtime
//!
//! Configuration is resolved once at startup into an immutable
//! [`RuntimeConfig`] and handed by reference to every component.
//! Nothing downstream reads the process environment on its own.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    auth::AuthConfig, function::FunctionConfig, handler::HandlerConfig, logging::LoggingConfig,
    server::ServerConfig, upstream::UpstreamConfig, RuntimeConfig,
};
