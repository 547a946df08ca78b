//! 容器配置加载


use common::init_test_logger;
use di_impl::{Bundle, Container, ContainerConfig, Dependency, DependencyError, DependencyResult};
use infrastructure_common::ConfigError;
use serde::Deserialize;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct CacheConfig {
    capacity: usize,
}

#[derive(Debug)]
struct Cache {
    capacity: usize,
}

#[derive(Default)]
struct CacheBundle;

impl Bundle for CacheBundle {
    type Config = CacheConfig;

    fn configure(
        self: Arc<Self>,
        container: &Container,
        config: Option<&CacheConfig>,
    ) -> DependencyResult<()> {
        let capacity = config.map_or(16, |c| c.capacity);
        container.singleton(
            |capacity: Arc<usize>| Cache {
                capacity: *capacity,
            },
            vec![Dependency::literal(capacity)],
        )?;
        container.instance(self);
        Ok(())
    }
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_container_from_config_file() {
    init_test_logger();
    let file = write_config(
        r#"
max_resolution_depth = 8

[parameters]
log_level = "debug"

[extensions.cachebundle]
capacity = 128
"#,
    );
    let config = ContainerConfig::load_with_prefix(Some(file.path()), "LORN_DI_IT_FILE").unwrap();
    assert_eq!(config.max_resolution_depth, 8);

    let container = Container::with_config(config);
    container.add_configured_extension::<CacheBundle>().unwrap();
    container.build().unwrap();

    assert_eq!(container.get::<Cache>().unwrap().capacity, 128);
    assert_eq!(container.get_parameter("log_level").unwrap(), json!("debug"));
}

#[test]
fn test_configured_extension_without_section_uses_defaults() {
    init_test_logger();
    let container = Container::new();
    container.add_configured_extension::<CacheBundle>().unwrap();
    container.build().unwrap();

    assert_eq!(container.get::<Cache>().unwrap().capacity, 16);
}

#[test]
fn test_invalid_extension_section() {
    init_test_logger();
    let mut config = ContainerConfig::default();
    config
        .extensions
        .insert("CacheBundle".to_string(), json!({ "capacity": "lots" }));

    let container = Container::with_config(config);
    let err = container.add_configured_extension::<CacheBundle>().unwrap_err();
    assert!(matches!(err, DependencyError::ExtensionConfigFailed { .. }));
    assert!(!container.has_extension("CacheBundle"));
}

#[test]
fn test_missing_config_file() {
    init_test_logger();
    let err = ContainerConfig::load_with_prefix(
        Some(std::path::Path::new("/nonexistent/container.toml")),
        "LORN_DI_IT_MISSING",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}

#[test]
fn test_depth_limit_from_config() {
    init_test_logger();
    let config = ContainerConfig {
        enable_circular_dependency_detection: false,
        max_resolution_depth: 2,
        ..ContainerConfig::default()
    };
    let container = Container::with_config(config);

    #[derive(Debug)]
    struct Level1;
    #[derive(Debug)]
    struct Level2;
    #[derive(Debug)]
    struct Level3;

    container.singleton(|| Level1, vec![]).unwrap();
    container
        .singleton(|_: Arc<Level1>| Level2, vec![Dependency::service::<Level1>()])
        .unwrap();
    container
        .singleton(|_: Arc<Level2>| Level3, vec![Dependency::service::<Level2>()])
        .unwrap();
    container.build().unwrap();

    let err = container.get::<Level3>().unwrap_err();
    assert!(matches!(
        err,
        DependencyError::ResolutionDepthExceeded { max_depth: 2, .. }
    ));
    assert!(container.get::<Level2>().is_ok());
}
