//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },

    #[error("配置序列化失败: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },
}

/// 依赖注入错误类型
///
/// 全部属于调用方的配置错误，不存在可重试的瞬时错误。
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("参数数量不匹配: {type_name} 的构造函数需要 {expected} 个依赖, 实际提供 {given} 个")]
    ArgumentCount {
        type_name: String,
        expected: usize,
        given: usize,
    },

    #[error("循环依赖检测到: {dependency_chain}")]
    CyclicalDependency { dependency_chain: String },

    #[error("容器尚未构建, 无法解析: {type_name}")]
    ContainerNotReady { type_name: String },

    #[error("容器已构建, 不能再覆盖服务: {type_name}")]
    OverrideAfterBuild { type_name: String },

    #[error("服务未注册: {type_name}")]
    ServiceNotFound { type_name: String },

    #[error("实例类型不匹配: {type_name}")]
    InstanceTypeMismatch { type_name: String },

    #[error("参数不存在: {key}")]
    ParameterNotFound { key: String },

    #[error("参数类型不匹配: {key}, 原因: {message}")]
    ParameterTypeMismatch { key: String, message: String },

    #[error("构造参数类型不匹配: {type_name} 的第 {position} 个参数应为 {expected}")]
    ArgumentTypeMismatch {
        type_name: String,
        position: usize,
        expected: String,
    },

    #[error("解析深度超过上限 {max_depth}: {type_name}")]
    ResolutionDepthExceeded { type_name: String, max_depth: usize },

    #[error("扩展配置失败: {bundle}, 原因: {message}")]
    ExtensionConfigFailed { bundle: String, message: String },
}

impl DependencyError {
    /// 创建服务未注册错误
    pub fn service_not_found(type_name: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            type_name: type_name.into(),
        }
    }

    /// 创建扩展配置错误
    pub fn extension_config(bundle: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExtensionConfigFailed {
            bundle: bundle.into(),
            message: message.into(),
        }
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
