use fnrt_config::FunctionConfig;
use serde::{Deserialize, Serialize};

/// Snapshot of the function's limits and identity, sent with every invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    #[serde(rename = "memoryLimitInMb")]
    pub memory_limit_in_mb: u32,
    #[serde(rename = "functionName")]
    pub function_name: String,
    #[serde(rename = "functionVersion")]
    pub function_version: String,
}

impl ExecutionContext {
    pub fn from_config(config: &FunctionConfig) -> Self {
        Self {
            memory_limit_in_mb: config.memory_limit_mb,
            function_name: config.name.clone(),
            function_version: config.version.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_wire_shape() {
        let context = ExecutionContext::from_config(&FunctionConfig {
            memory_limit_mb: 256,
            name: "thumbnailer".to_string(),
            version: "4".to_string(),
        });

        assert_eq!(
            serde_json::to_value(&context).unwrap(),
            json!({"memoryLimitInMb": 256, "functionName": "thumbnailer", "functionVersion": "4"})
        );
    }

    #[test]
    fn test_default_memory_limit() {
        let context = ExecutionContext::from_config(&FunctionConfig::default());
        assert_eq!(context.memory_limit_in_mb, 128);
        assert!(context.function_name.is_empty());
    }
}
