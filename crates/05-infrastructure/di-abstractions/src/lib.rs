//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义服务注册和依赖解析的核心数据结构。
//!
//! ## 核心类型
//!
//! - [`Dependency`] - 依赖声明（服务引用或字面量）
//! - [`Instance`] - 类型擦除的服务实例
//! - [`Constructor`] - 由签名推断参数数量的构造函数
//! - [`Registration`] - 服务注册描述符
//! - [`ResolveContext`] - 解析链，用于循环依赖和深度检测
//! - [`ContainerConfig`] - 容器配置

pub mod container;
pub mod factory;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use factory::*;
pub use registry::*;
pub use resolver::*;
