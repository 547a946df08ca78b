//! # 依赖注入具体实现
//!
//! 提供依赖注入容器、服务覆盖、扩展包和全局参数的实现。
//!
//! ```
//! use di_impl::{Container, Dependency};
//! use std::sync::Arc;
//!
//! struct Config {
//!     url: String,
//! }
//!
//! struct Client {
//!     config: Arc<Config>,
//!     retries: u32,
//! }
//!
//! let container = Container::new();
//! container
//!     .singleton(
//!         |url: Arc<&'static str>| Config { url: url.to_string() },
//!         vec![Dependency::literal("http://localhost")],
//!     )
//!     .unwrap();
//! container
//!     .transient(
//!         |config: Arc<Config>, retries: Arc<u32>| Client { config, retries: *retries },
//!         vec![Dependency::service::<Config>(), Dependency::literal(3u32)],
//!     )
//!     .unwrap();
//! container.build().unwrap();
//!
//! let client = container.get::<Client>().unwrap();
//! assert_eq!(client.config.url, "http://localhost");
//! assert_eq!(client.retries, 3);
//! ```

pub mod container;
pub mod extension;
pub mod global;
pub mod logging;
mod parameters;

pub use container::Container;
pub use extension::Bundle;
pub use global::{clear_global_container, global_container, set_global_container};
pub use logging::LoggingConfig;

pub use di_abstractions::{ContainerConfig, ContainerStats, Dependency, Instance};
pub use infrastructure_common::{DependencyError, DependencyResult, Lifetime, TypeInfo};
