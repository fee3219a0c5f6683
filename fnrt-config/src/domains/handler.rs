//! Handler resolution metadata

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// How the handler sub-process is launched and located
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HandlerConfig {
    /// Exported function used as the handler (interpreted runtimes only)
    pub name: String,

    /// Absolute path to the handler file, or to the handler binary
    pub path: String,

    /// Absolute path to the runtime binary (e.g. python, node)
    pub runtime_binary: String,

    /// Absolute path to the bridge script run by the runtime binary
    pub runtime_bridge: String,

    /// Whether the handler is a precompiled binary
    pub is_binary: bool,
}

impl Validatable for HandlerConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.path, "path", self.domain_name())?;
        if !self.is_binary {
            validate_required_string(&self.runtime_binary, "runtime_binary", self.domain_name())?;
            validate_required_string(&self.runtime_bridge, "runtime_bridge", self.domain_name())?;
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "handler"
    }
}
