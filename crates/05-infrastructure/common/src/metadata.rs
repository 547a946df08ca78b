//! 元数据定义
//!
//! 提供服务类型的身份与名称信息

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 类型信息
///
/// 相等性只由 `TypeId` 决定，名称仅用于日志、错误信息和按名称查找。
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// 类型名称（不含模块路径）
    pub name: &'static str,
    /// 类型ID
    pub id: TypeId,
    /// 完整类型路径
    pub module_path: &'static str,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        let full = std::any::type_name::<T>();
        Self {
            name: short_type_name(full),
            id: TypeId::of::<T>(),
            module_path: full,
        }
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &'static str {
        self.name
    }

    /// 名称是否指向该类型（短名称或完整路径均可）
    pub fn matches_name(&self, name: &str) -> bool {
        self.name == name || self.module_path == name
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 去掉模块路径，保留泛型参数和 `dyn` 前缀
fn short_type_name(full: &'static str) -> &'static str {
    let generic_start = full.find('<').unwrap_or(full.len());
    let head = &full[..generic_start];
    match head.rfind("::") {
        Some(pos) if !head.starts_with("dyn ") => &full[pos + 2..],
        _ => full,
    }
}
