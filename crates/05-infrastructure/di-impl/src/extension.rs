//! 扩展包
//!
//! 扩展包是一组相关服务的注册单元。添加扩展时立即构造扩展实例，
//! 容器构建时按添加顺序调用每个扩展的 [`Bundle::configure`]，扩展在其中注册
//! 自己提供的服务，并把自身注册为服务以便 [`Container::get_extension`] 找到它。

use crate::container::Container;
use di_abstractions::Instance;
use infrastructure_common::{DependencyError, DependencyResult, TypeInfo};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 扩展包 trait
pub trait Bundle: Send + Sync + 'static {
    /// 扩展配置类型
    type Config: Send + Sync + 'static;

    /// 注册扩展提供的服务
    ///
    /// `config` 为最近一次 `add_extension` 提供的配置。
    fn configure(
        self: Arc<Self>,
        container: &Container,
        config: Option<&Self::Config>,
    ) -> DependencyResult<()>;
}

/// 类型擦除的扩展条目
trait ErasedBundle: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn configure(&self, container: &Container) -> DependencyResult<()>;
}

struct BundleEntry<B: Bundle> {
    bundle: Arc<B>,
    config: Mutex<Option<Arc<B::Config>>>,
}

impl<B: Bundle> ErasedBundle for BundleEntry<B> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn configure(&self, container: &Container) -> DependencyResult<()> {
        let config = self.config.lock().clone();
        self.bundle.clone().configure(container, config.as_deref())
    }
}

struct ExtensionSlot {
    type_info: TypeInfo,
    entry: Arc<dyn ErasedBundle>,
    configured: bool,
}

/// 按添加顺序保存的扩展集合，以及名称到类型的索引
#[derive(Default)]
pub(crate) struct ExtensionSet {
    slots: Vec<ExtensionSlot>,
    names: HashMap<String, TypeInfo>,
    /// 被多个扩展共用的短名称，只能通过完整路径查找
    ambiguous: HashSet<String>,
}

impl ExtensionSet {
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    fn find(&self, id: TypeId) -> Option<&ExtensionSlot> {
        self.slots.iter().find(|slot| slot.type_info.id == id)
    }

    fn lookup(&self, name: &str) -> Option<TypeInfo> {
        self.names.get(name).copied()
    }

    /// 尚未配置的扩展，按添加顺序排列
    fn pending(&self) -> Vec<(TypeInfo, Arc<dyn ErasedBundle>)> {
        self.slots
            .iter()
            .filter(|slot| !slot.configured)
            .map(|slot| (slot.type_info, slot.entry.clone()))
            .collect()
    }

    fn mark_configured(&mut self, id: TypeId) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.type_info.id == id) {
            slot.configured = true;
        }
    }

    fn index_names(&mut self, type_info: TypeInfo) {
        self.names.insert(type_info.module_path.to_string(), type_info);

        let short = type_info.name;
        if self.ambiguous.contains(short) {
            return;
        }
        match self.names.get(short).copied() {
            Some(existing) if existing != type_info => {
                warn!(
                    "扩展短名称冲突: {} 与 {}, 只能通过完整路径查找",
                    existing.module_path, type_info.module_path
                );
                self.names.remove(short);
                self.ambiguous.insert(short.to_string());
            }
            _ => {
                self.names.insert(short.to_string(), type_info);
            }
        }
    }
}

impl Container {
    /// 添加扩展
    ///
    /// 扩展实例立即以 `Default` 构造。重复添加同一扩展时保留第一次构造的实例，
    /// 但提供的配置会替换之前的配置。
    pub fn add_extension<B>(&self, config: Option<B::Config>)
    where
        B: Bundle + Default,
    {
        let type_info = TypeInfo::of::<B>();
        let mut extensions = self.inner().extensions.lock();

        if let Some(slot) = extensions.find(type_info.id) {
            if let Some(config) = config {
                if let Some(entry) = slot.entry.as_any().downcast_ref::<BundleEntry<B>>() {
                    *entry.config.lock() = Some(Arc::new(config));
                    debug!("更新扩展配置: {}", type_info.module_path);
                }
            }
            return;
        }

        let entry = BundleEntry {
            bundle: Arc::new(B::default()),
            config: Mutex::new(config.map(Arc::new)),
        };
        extensions.index_names(type_info);
        extensions.slots.push(ExtensionSlot {
            type_info,
            entry: Arc::new(entry),
            configured: false,
        });
        info!("添加扩展: {}", type_info.module_path);
    }

    /// 添加扩展，配置取自容器配置中 `extensions.<扩展名>` 一节
    pub fn add_configured_extension<B>(&self) -> DependencyResult<()>
    where
        B: Bundle + Default,
        B::Config: DeserializeOwned,
    {
        let type_info = TypeInfo::of::<B>();
        let config = match self.config().extension_config(type_info.name) {
            Some(value) => Some(
                serde_json::from_value::<B::Config>(value.clone()).map_err(|e| {
                    DependencyError::extension_config(type_info.name, e.to_string())
                })?,
            ),
            None => None,
        };

        self.add_extension::<B>(config);
        Ok(())
    }

    /// 按名称检查扩展是否已添加
    pub fn has_extension(&self, name: &str) -> bool {
        self.inner().extensions.lock().lookup(name).is_some()
    }

    /// 获取扩展
    ///
    /// 扩展未添加或未注册为服务时返回 `Ok(None)`。
    pub fn get_extension<B: Bundle>(&self) -> DependencyResult<Option<Arc<B>>> {
        let added = self
            .inner()
            .extensions
            .lock()
            .find(TypeId::of::<B>())
            .is_some();
        if !added {
            debug!("扩展未添加: {}", TypeInfo::of::<B>().module_path);
            return Ok(None);
        }
        self.resolve::<B>(false)
    }

    /// 按名称获取扩展，名称可以是短类型名或完整类型路径
    pub fn get_extension_by_name<T>(&self, name: &str) -> DependencyResult<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let Some(type_info) = self.inner().extensions.lock().lookup(name) else {
            debug!("扩展未添加: {}", name);
            return Ok(None);
        };

        if type_info.id != TypeId::of::<T>() {
            return Err(DependencyError::InstanceTypeMismatch {
                type_name: name.to_string(),
            });
        }
        self.resolve::<T>(false)
    }

    /// 按名称获取类型擦除的扩展实例
    ///
    /// 供只持有扩展名称的调用方使用，取出后可自行 [`Instance::downcast`]。
    pub fn get_extension_instance(&self, name: &str) -> DependencyResult<Option<Instance>> {
        let Some(type_info) = self.inner().extensions.lock().lookup(name) else {
            debug!("扩展未添加: {}", name);
            return Ok(None);
        };
        self.resolve_erased(type_info, false)
    }

    /// 按添加顺序配置尚未配置的扩展
    ///
    /// 配置失败时停止，失败的扩展及其后的扩展在下一次构建时重新配置。
    pub(crate) fn configure_extensions(&self) -> DependencyResult<()> {
        let pending = self.inner().extensions.lock().pending();

        for (type_info, entry) in pending {
            debug!("配置扩展: {}", type_info.module_path);
            if let Err(e) = entry.configure(self) {
                warn!("扩展配置失败: {}, 原因: {}", type_info.module_path, e);
                return Err(e);
            }
            self.inner().extensions.lock().mark_configured(type_info.id);
            info!("扩展配置完成: {}", type_info.module_path);
        }
        Ok(())
    }
}
