//! # Infrastructure Common
//!
//! 这个 crate 提供了 Lorn DI 容器各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`DependencyError`] - 依赖注入错误分类
//! - [`ConfigError`] - 容器配置加载错误
//! - [`Lifetime`] - 服务生命周期（共享 / 瞬时）
//! - [`TypeInfo`] - 以类型身份为键的类型信息
//!
//! ## 设计原则
//!
//! - 类型身份基于 `TypeId`，而非结构相等
//! - 所有错误均为调用方的配置错误，同步返回

pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
