//! 容器配置与统计
//!
//! 配置可以从 TOML / JSON 文件和环境变量加载

use crate::resolver::ResolveOptions;
use infrastructure_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// 默认环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "DI";

/// 容器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 是否启用解析时循环依赖检测
    pub enable_circular_dependency_detection: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
    /// 初始参数
    pub parameters: HashMap<String, Value>,
    /// 按扩展名称索引的扩展配置
    pub extensions: HashMap<String, Value>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            enable_circular_dependency_detection: true,
            max_resolution_depth: 100,
            parameters: HashMap::new(),
            extensions: HashMap::new(),
        }
    }
}

impl ContainerConfig {
    /// 从配置文件和 `DI__` 前缀的环境变量加载
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_with_prefix(path, DEFAULT_ENV_PREFIX)
    }

    /// 从配置文件和指定前缀的环境变量加载
    pub fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            debug!("加载容器配置文件: {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__"),
        );

        let settings = builder.build().map_err(|e| ConfigError::ParseError {
            source: Box::new(e),
        })?;
        let loaded: Self = settings
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })?;

        loaded.validate()?;
        debug!(
            "容器配置加载完成: {} 个参数, {} 个扩展配置",
            loaded.parameters.len(),
            loaded.extensions.len()
        );
        Ok(loaded)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_resolution_depth 必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    /// 查找扩展配置，名称不区分大小写
    pub fn extension_config(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name).or_else(|| {
            self.extensions
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
    }

    /// 转换为解析选项
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            detect_cycles: self.enable_circular_dependency_detection,
            max_depth: self.max_resolution_depth,
        }
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// 已注册服务数量（包含容器自身）
    pub registered_services: usize,
    /// 已缓存的共享实例数量
    pub active_singletons: usize,
    /// 解析总次数（包含嵌套依赖）
    pub resolutions: usize,
    /// 待应用的覆盖数量
    pub pending_overrides: usize,
    /// 已添加的扩展数量
    pub extensions: usize,
}
