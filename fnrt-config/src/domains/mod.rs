//! Domain-specific configuration modules

pub mod auth;
pub mod function;
pub mod handler;
pub mod logging;
pub mod server;
pub mod upstream;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main runtime configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Inbound listener configuration
    #[serde(default)]
    pub server: server::ServerConfig,

    /// Handler sub-process endpoint and retry budget
    #[serde(default)]
    pub upstream: upstream::UpstreamConfig,

    /// Caller authentication
    #[serde(default)]
    pub auth: auth::AuthConfig,

    /// Handler resolution metadata
    #[serde(default)]
    pub handler: handler::HandlerConfig,

    /// Execution context values exposed to the handler
    #[serde(default)]
    pub function: function::FunctionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl RuntimeConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.upstream.validate()?;
        self.auth.validate()?;
        self.handler.validate()?;
        self.function.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Render the configuration as YAML
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
