//! 全局参数
//!
//! 与类型注册表无关的字符串键值存储，用于多个扩展共享的横切配置（例如日志级别）。

use crate::container::Container;
use dashmap::DashMap;
use infrastructure_common::{DependencyError, DependencyResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// 参数存储
#[derive(Debug, Default)]
pub(crate) struct ParameterStore {
    values: DashMap<String, Value>,
}

impl ParameterStore {
    pub(crate) fn from_map(initial: HashMap<String, Value>) -> Self {
        Self {
            values: initial.into_iter().collect(),
        }
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).map(|entry| entry.value().clone())
    }
}

impl Container {
    /// 设置参数，已存在时覆盖
    pub fn set_parameter(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        debug!("设置参数: {}", key);
        self.inner().parameters.values.insert(key, value.into());
    }

    /// 获取参数
    ///
    /// 参数不存在或为 `null` 时返回 [`DependencyError::ParameterNotFound`]。
    pub fn get_parameter(&self, key: &str) -> DependencyResult<Value> {
        match self.inner().parameters.get(key) {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(DependencyError::ParameterNotFound {
                key: key.to_string(),
            }),
        }
    }

    /// 查找参数，不存在时返回 `None`
    pub fn find_parameter(&self, key: &str) -> Option<Value> {
        self.inner().parameters.get(key)
    }

    /// 获取参数并反序列化为指定类型
    pub fn get_parameter_as<T: DeserializeOwned>(&self, key: &str) -> DependencyResult<T> {
        let value = self.get_parameter(key)?;
        serde_json::from_value(value).map_err(|e| DependencyError::ParameterTypeMismatch {
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}
