//! 服务生命周期

use serde::{Deserialize, Serialize};
use std::fmt;

/// 服务生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// 共享模式 - 每个容器只创建一个实例，首次解析时创建
    #[default]
    Shared,
    /// 瞬时模式 - 每次解析或注入都创建新实例
    Transient,
}

impl Lifetime {
    /// 是否缓存实例
    pub fn is_shared(self) -> bool {
        matches!(self, Self::Shared)
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => f.write_str("shared"),
            Self::Transient => f.write_str("transient"),
        }
    }
}
