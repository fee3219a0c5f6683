//! Integration tests for fnrt-config

use fnrt_config::domains::logging::{LogFormat, LogLevel};
use fnrt_config::*;
use std::io::Write;
use std::time::Duration;
use temp_env::with_vars;

fn handler_vars() -> Vec<(&'static str, Option<&'static str>)> {
    vec![
        ("SCW_HANDLER_PATH", Some("/home/app/function/handler.py")),
        ("SCW_HANDLER_NAME", Some("handle")),
        ("SCW_RUNTIME_BINARY", Some("/usr/bin/python3")),
        ("SCW_RUNTIME_BRIDGE", Some("/home/app/runtimes/python3/index.py")),
    ]
}

#[test]
fn test_config_loader_from_env() {
    let mut vars = handler_vars();
    vars.extend([
        ("PORT", Some("9090")),
        ("SCW_PUBLIC", Some("false")),
        ("SCW_APPLICATION_ID", Some("app-id")),
        ("SCW_NAMESPACE_ID", Some("namespace-id")),
        ("SCW_UPSTREAM_HOST", Some("http://localhost")),
        ("SCW_UPSTREAM_PORT", Some("9091")),
        ("SCW_APPLICATION_MEMORY", Some("256")),
        ("SCW_APPLICATION_NAME", Some("my-function")),
        ("SCW_APPLICATION_VERSION", Some("3")),
        ("SCW_LOG_LEVEL", Some("debug")),
        ("SCW_LOG_FORMAT", Some("json")),
    ]);

    with_vars(vars, || {
        let config = ConfigLoader::new().from_env().unwrap();

        assert_eq!(config.server.port, 9090);
        assert!(!config.auth.public);
        assert_eq!(config.auth.application_id, "app-id");
        assert_eq!(config.auth.namespace_id, "namespace-id");
        assert_eq!(config.upstream.upstream_url(), "http://localhost:9091");
        assert_eq!(config.handler.name, "handle");
        assert!(!config.handler.is_binary);
        assert_eq!(config.function.memory_limit_mb, 256);
        assert_eq!(config.function.name, "my-function");
        assert_eq!(config.function.version, "3");
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
    });
}

#[test]
fn test_unparseable_values_fall_back_to_defaults() {
    let mut vars = handler_vars();
    vars.extend([
        ("PORT", Some("not-a-port")),
        ("SCW_APPLICATION_MEMORY", Some("lots")),
        ("SCW_UPSTREAM_HOST", Some("")),
        ("SCW_UPSTREAM_PORT", Some("")),
    ]);

    with_vars(vars, || {
        let config = ConfigLoader::new().from_env().unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.function.memory_limit_mb, 128);
        assert_eq!(config.upstream.upstream_url(), "http://127.0.0.1:8081");
    });
}

#[test]
fn test_boolean_flags_require_exact_true() {
    let mut vars = handler_vars();
    vars.extend([
        ("SCW_PUBLIC", Some("TRUE")),
        ("SCW_HANDLER_IS_BINARY", Some("true")),
    ]);

    with_vars(vars, || {
        let config = ConfigLoader::new().from_env().unwrap();
        assert!(!config.auth.public);
        assert!(config.handler.is_binary);
    });
}

#[test]
fn test_empty_public_key_is_absent() {
    let mut vars = handler_vars();
    vars.push(("SCW_PUBLIC_KEY", Some("")));

    with_vars(vars, || {
        let config = ConfigLoader::new().from_env().unwrap();
        assert!(config.auth.public_key_pem.is_none());
    });
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let mut vars = handler_vars();
    vars.push(("SCW_LOG_LEVEL", Some("chatty")));

    with_vars(vars, || {
        let result = ConfigLoader::new().from_env();
        assert!(matches!(result, Err(ConfigError::EnvError(_))));
    });
}

#[test]
fn test_missing_handler_path_fails_validation() {
    with_vars(
        vec![("SCW_HANDLER_PATH", None::<&str>), ("SCW_HANDLER_IS_BINARY", Some("true"))],
        || {
            let result = ConfigLoader::new().from_env();
            assert!(matches!(result, Err(ConfigError::DomainError { .. })));
        },
    );
}

#[test]
fn test_file_config_with_env_override() {
    let yaml = r#"
server:
  port: 7000
upstream:
  port: 7001
  retry_attempts: 20
  retry_interval: 10ms
handler:
  path: /opt/handler
  is_binary: true
function:
  name: from-file
"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    with_vars(
        vec![
            ("PORT", None),
            ("SCW_HANDLER_PATH", None),
            ("SCW_APPLICATION_NAME", Some("from-env")),
        ],
        || {
            let config = ConfigLoader::new().from_file(file.path()).unwrap();

            assert_eq!(config.server.port, 7000);
            assert_eq!(config.upstream.port, 7001);
            assert_eq!(config.upstream.retry_attempts, 20);
            assert_eq!(config.upstream.retry_interval, Duration::from_millis(10));
            assert!(config.handler.is_binary);
            assert_eq!(config.function.name, "from-env");
            assert_eq!(config.function.memory_limit_mb, 128);
        },
    );
}

#[test]
fn test_yaml_rendering_parses_back() {
    let mut config = RuntimeConfig::default();
    config.handler.path = "/opt/handler".to_string();
    config.handler.is_binary = true;

    let yaml = config.to_yaml().unwrap();
    let parsed: RuntimeConfig = serde_yaml::from_str(&yaml).unwrap();
    assert!(parsed.validate_all().is_ok());
    assert_eq!(parsed.upstream.retry_interval, Duration::from_millis(50));
}
