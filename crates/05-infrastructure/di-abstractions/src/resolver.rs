//! 解析上下文
//!
//! 记录当前解析链，用于在递归解析时检测循环依赖和限制解析深度

use infrastructure_common::{DependencyError, TypeInfo};

/// 解析上下文
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// 当前解析链，用于检测循环依赖
    pub resolution_chain: Vec<TypeInfo>,
    /// 解析选项
    pub options: ResolveOptions,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            resolution_chain: Vec::new(),
            options,
        }
    }

    /// 添加类型到解析链
    pub fn push_type(&mut self, type_info: TypeInfo) -> Result<(), DependencyError> {
        if self.options.detect_cycles && self.resolution_chain.contains(&type_info) {
            return Err(DependencyError::CyclicalDependency {
                dependency_chain: self.describe_chain(type_info),
            });
        }

        if self.resolution_chain.len() >= self.options.max_depth {
            return Err(DependencyError::ResolutionDepthExceeded {
                type_name: type_info.name.to_string(),
                max_depth: self.options.max_depth,
            });
        }

        self.resolution_chain.push(type_info);
        Ok(())
    }

    /// 从解析链中移除类型
    pub fn pop_type(&mut self) {
        self.resolution_chain.pop();
    }

    /// 当前解析深度
    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    fn describe_chain(&self, next: TypeInfo) -> String {
        self.resolution_chain
            .iter()
            .chain(std::iter::once(&next))
            .map(|info| info.name)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new(ResolveOptions::default())
    }
}

/// 解析选项
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// 是否在解析时检测循环依赖
    pub detect_cycles: bool,
    /// 最大递归深度
    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            detect_cycles: true,
            max_depth: 100,
        }
    }
}
