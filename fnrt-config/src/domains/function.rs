//! Execution context values of the deployed function

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};

/// Memory limit assumed when none is configured
pub const DEFAULT_MEMORY_LIMIT_MB: u32 = 128;

/// Function identity and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionConfig {
    /// Memory limit in megabytes
    #[serde(default = "default_memory_limit_mb")]
    pub memory_limit_mb: u32,

    /// Function name
    pub name: String,

    /// Function version
    pub version: String,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            memory_limit_mb: default_memory_limit_mb(),
            name: String::new(),
            version: String::new(),
        }
    }
}

impl Validatable for FunctionConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.memory_limit_mb, "memory_limit_mb", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "function"
    }
}

fn default_memory_limit_mb() -> u32 {
    DEFAULT_MEMORY_LIMIT_MB
}
