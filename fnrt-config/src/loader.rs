//! Configuration loading and environment variable handling

use crate::domains::function::DEFAULT_MEMORY_LIMIT_MB;
use crate::domains::RuntimeConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with the platform prefix
    pub fn new() -> Self {
        Self {
            prefix: "SCW".to_string(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<RuntimeConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: RuntimeConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<RuntimeConfig> {
        let mut config = RuntimeConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<RuntimeConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut RuntimeConfig) -> ConfigResult<()> {
        self.apply_server_overrides(&mut config.server);
        self.apply_upstream_overrides(&mut config.upstream)?;
        self.apply_auth_overrides(&mut config.auth);
        self.apply_handler_overrides(&mut config.handler);
        self.apply_function_overrides(&mut config.function);
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// The listener port is the one setting the platform injects without prefix
    fn apply_server_overrides(&self, config: &mut crate::domains::server::ServerConfig) {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => log::warn!("Ignoring unparseable PORT '{}', keeping {}", port, config.port),
            }
        }
    }

    /// Apply upstream overrides
    fn apply_upstream_overrides(
        &self,
        config: &mut crate::domains::upstream::UpstreamConfig,
    ) -> ConfigResult<()> {
        if let Some(host) = self.get_non_empty("UPSTREAM_HOST") {
            config.host = host;
        }

        if let Some(port) = self.get_non_empty("UPSTREAM_PORT") {
            config.port = port
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid UPSTREAM_PORT: {}", e)))?;
        }

        Ok(())
    }

    /// Apply auth overrides
    fn apply_auth_overrides(&self, config: &mut crate::domains::auth::AuthConfig) {
        if let Ok(public) = self.get_env_var("PUBLIC") {
            config.public = public == "true";
        }

        if let Ok(pem) = self.get_env_var("PUBLIC_KEY") {
            config.public_key_pem = if pem.is_empty() { None } else { Some(pem) };
        }

        if let Ok(application_id) = self.get_env_var("APPLICATION_ID") {
            config.application_id = application_id;
        }

        if let Ok(namespace_id) = self.get_env_var("NAMESPACE_ID") {
            config.namespace_id = namespace_id;
        }
    }

    /// Apply handler overrides
    fn apply_handler_overrides(&self, config: &mut crate::domains::handler::HandlerConfig) {
        if let Ok(name) = self.get_env_var("HANDLER_NAME") {
            config.name = name;
        }

        if let Ok(path) = self.get_env_var("HANDLER_PATH") {
            config.path = path;
        }

        if let Ok(binary) = self.get_env_var("RUNTIME_BINARY") {
            config.runtime_binary = binary;
        }

        if let Ok(bridge) = self.get_env_var("RUNTIME_BRIDGE") {
            config.runtime_bridge = bridge;
        }

        if let Ok(is_binary) = self.get_env_var("HANDLER_IS_BINARY") {
            config.is_binary = is_binary == "true";
        }
    }

    /// Apply function context overrides
    fn apply_function_overrides(&self, config: &mut crate::domains::function::FunctionConfig) {
        if let Ok(memory) = self.get_env_var("APPLICATION_MEMORY") {
            config.memory_limit_mb = memory.parse().unwrap_or_else(|_| {
                log::warn!(
                    "Unparseable APPLICATION_MEMORY '{}', using {} MB",
                    memory,
                    DEFAULT_MEMORY_LIMIT_MB
                );
                DEFAULT_MEMORY_LIMIT_MB
            });
        }

        if let Ok(name) = self.get_env_var("APPLICATION_NAME") {
            config.name = name;
        }

        if let Ok(version) = self.get_env_var("APPLICATION_VERSION") {
            config.version = version;
        }
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = log_level
                .parse()
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = format
                .parse()
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }

    fn get_non_empty(&self, name: &str) -> Option<String> {
        self.get_env_var(name).ok().filter(|value| !value.is_empty())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
