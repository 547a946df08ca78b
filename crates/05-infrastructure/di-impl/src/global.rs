//! 进程级容器
//!
//! 可选的便利设施。应用通常应自行持有并传递 [`Container`]。

use crate::container::Container;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::info;

/// 全局容器
static GLOBAL_CONTAINER: Lazy<RwLock<Option<Container>>> = Lazy::new(|| RwLock::new(None));

/// 设置全局容器，返回之前设置的容器
pub fn set_global_container(container: Container) -> Option<Container> {
    info!("设置全局容器");
    GLOBAL_CONTAINER.write().replace(container)
}

/// 获取全局容器
pub fn global_container() -> Option<Container> {
    GLOBAL_CONTAINER.read().clone()
}

/// 清除全局容器
pub fn clear_global_container() -> Option<Container> {
    GLOBAL_CONTAINER.write().take()
}
