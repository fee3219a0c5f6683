//! Configuration of the channel to the handler sub-process

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upstream (handler sub-runtime) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Scheme and host of the sub-runtime HTTP server
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the sub-runtime HTTP server
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of delivery attempts while the sub-runtime is cold-starting
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed pause between delivery attempts
    #[serde(with = "humantime_serde", default = "default_retry_interval")]
    pub retry_interval: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            retry_attempts: default_retry_attempts(),
            retry_interval: default_retry_interval(),
        }
    }
}

impl UpstreamConfig {
    /// URL the sub-runtime is expected to listen on
    pub fn upstream_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Total time spent retrying before giving up
    pub fn retry_budget(&self) -> Duration {
        self.retry_interval * self.retry_attempts
    }
}

impl Validatable for UpstreamConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.upstream_url(), "upstream url", self.domain_name())?;
        validate_positive(self.retry_attempts, "retry_attempts", self.domain_name())?;
        if self.retry_interval.is_zero() {
            return Err(self.validation_error("retry_interval must be greater than 0"));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "upstream"
    }
}

fn default_host() -> String {
    "http://127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_retry_attempts() -> u32 {
    200
}

fn default_retry_interval() -> Duration {
    Duration::from_millis(50)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_defaults() {
        let config = UpstreamConfig::default();
        assert_eq!(config.upstream_url(), "http://127.0.0.1:8081");
        assert_eq!(config.retry_budget(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_upstream_rejects_invalid_host() {
        let config = UpstreamConfig {
            host: "::not a host::".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_interval_uses_humantime() {
        let config: UpstreamConfig = serde_yaml::from_str("retry_interval: 20ms\nretry_attempts: 5\n").unwrap();
        assert_eq!(config.retry_interval, Duration::from_millis(20));
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.port, 8081);
    }
}
