//! 依赖注入容器
//!
//! 注册、构建、解析三个阶段：注册服务（以及覆盖和扩展）之后调用一次
//! [`Container::build`]，之后才能通过 [`Container::get`] 解析服务。

use crate::extension::ExtensionSet;
use crate::parameters::ParameterStore;
use di_abstractions::{
    Arguments, Constructor, ContainerConfig, ContainerStats, Dependency, Instance, Registration,
    ResolveContext, ServiceFactory,
};
use infrastructure_common::{DependencyError, DependencyResult, Lifetime, TypeInfo};
use parking_lot::{Mutex, RwLock};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// 待应用的服务覆盖
struct OverrideEntry {
    base: TypeInfo,
    replacement: Registration,
}

/// 容器共享状态
pub(crate) struct ContainerInner {
    pub(crate) config: ContainerConfig,
    compiled: AtomicBool,
    /// 服务注册表
    registrations: RwLock<HashMap<TypeId, Registration>>,
    /// 共享实例缓存
    instances: RwLock<HashMap<TypeId, Instance>>,
    /// 按添加顺序排列的覆盖表
    overrides: Mutex<Vec<OverrideEntry>>,
    pub(crate) extensions: Mutex<ExtensionSet>,
    pub(crate) parameters: ParameterStore,
    resolutions: AtomicUsize,
}

/// 依赖注入容器
///
/// `Container` 是共享状态的句柄，克隆开销很小，所有克隆指向同一个容器。
/// 容器会把自己注册为服务，`get::<Container>()` 返回指向同一状态的句柄。
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    /// 使用默认配置创建容器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 使用指定配置创建容器
    pub fn with_config(config: ContainerConfig) -> Self {
        let parameters = ParameterStore::from_map(config.parameters.clone());
        let inner = Arc::new_cyclic(|weak: &Weak<ContainerInner>| {
            let mut registrations = HashMap::new();
            let self_registration = Self::self_registration(weak.clone());
            registrations.insert(self_registration.type_info.id, self_registration);

            ContainerInner {
                config,
                compiled: AtomicBool::new(false),
                registrations: RwLock::new(registrations),
                instances: RwLock::new(HashMap::new()),
                overrides: Mutex::new(Vec::new()),
                extensions: Mutex::new(ExtensionSet::default()),
                parameters,
                resolutions: AtomicUsize::new(0),
            }
        });

        debug!("创建依赖注入容器");
        Self { inner }
    }

    /// 容器自身的注册信息
    ///
    /// 以瞬时方式登记，每次解析得到一个新句柄，避免实例缓存持有容器自身。
    fn self_registration(weak: Weak<ContainerInner>) -> Registration {
        let factory: ServiceFactory = Arc::new(move |_: &Arguments| {
            weak.upgrade()
                .map(|inner| Instance::from_value(Container { inner }))
                .ok_or_else(|| DependencyError::service_not_found(TypeInfo::of::<Container>().name))
        });

        Registration {
            type_info: TypeInfo::of::<Container>(),
            dependencies: Vec::new(),
            lifetime: Lifetime::Transient,
            arity: 0,
            factory,
        }
    }

    pub(crate) fn inner(&self) -> &ContainerInner {
        &self.inner
    }

    /// 两个句柄是否指向同一个容器
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// 容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.inner.config
    }

    /// 容器是否已构建
    pub fn is_built(&self) -> bool {
        self.inner.compiled.load(Ordering::SeqCst)
    }

    // ========================================================================
    // 注册
    // ========================================================================

    /// 注册服务
    ///
    /// 依赖列表的长度必须与构造函数的参数数量一致，且不能包含服务自身。
    /// 重复注册同一类型时后一次注册生效。
    pub fn register<T, C, Args>(
        &self,
        constructor: C,
        dependencies: Vec<Dependency>,
        lifetime: Lifetime,
    ) -> DependencyResult<()>
    where
        T: Send + Sync + 'static,
        C: Constructor<Args, Output = T>,
    {
        let registration = Registration::for_value(constructor, dependencies, lifetime)?;
        self.insert_registration(registration);
        Ok(())
    }

    /// 注册共享服务
    pub fn singleton<T, C, Args>(
        &self,
        constructor: C,
        dependencies: Vec<Dependency>,
    ) -> DependencyResult<()>
    where
        T: Send + Sync + 'static,
        C: Constructor<Args, Output = T>,
    {
        self.register(constructor, dependencies, Lifetime::Shared)
    }

    /// 注册瞬时服务
    pub fn transient<T, C, Args>(
        &self,
        constructor: C,
        dependencies: Vec<Dependency>,
    ) -> DependencyResult<()>
    where
        T: Send + Sync + 'static,
        C: Constructor<Args, Output = T>,
    {
        self.register(constructor, dependencies, Lifetime::Transient)
    }

    /// 注册返回 `Arc<T>` 的服务，`T` 可以是 trait 对象
    pub fn register_arc<T, C, Args>(
        &self,
        constructor: C,
        dependencies: Vec<Dependency>,
        lifetime: Lifetime,
    ) -> DependencyResult<()>
    where
        T: ?Sized + Send + Sync + 'static,
        C: Constructor<Args, Output = Arc<T>>,
    {
        let registration = Registration::for_arc(constructor, dependencies, lifetime)?;
        self.insert_registration(registration);
        Ok(())
    }

    /// 注册返回 `Arc<T>` 的共享服务
    pub fn singleton_arc<T, C, Args>(
        &self,
        constructor: C,
        dependencies: Vec<Dependency>,
    ) -> DependencyResult<()>
    where
        T: ?Sized + Send + Sync + 'static,
        C: Constructor<Args, Output = Arc<T>>,
    {
        self.register_arc(constructor, dependencies, Lifetime::Shared)
    }

    /// 注册返回 `Arc<T>` 的瞬时服务
    pub fn transient_arc<T, C, Args>(
        &self,
        constructor: C,
        dependencies: Vec<Dependency>,
    ) -> DependencyResult<()>
    where
        T: ?Sized + Send + Sync + 'static,
        C: Constructor<Args, Output = Arc<T>>,
    {
        self.register_arc(constructor, dependencies, Lifetime::Transient)
    }

    /// 注册已构造好的共享实例
    pub fn instance<T>(&self, service: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.insert_registration(Registration::for_instance(service));
    }

    fn insert_registration(&self, registration: Registration) {
        let type_info = registration.type_info;
        let lifetime = registration.lifetime;
        let dependency_count = registration.dependencies.len();

        let previous = self
            .inner
            .registrations
            .write()
            .insert(type_info.id, registration);
        self.inner.instances.write().remove(&type_info.id);

        if previous.is_some() {
            warn!("服务重复注册, 覆盖之前的注册: {}", type_info.module_path);
        }
        info!(
            "注册服务: {} ({}, {} 个依赖)",
            type_info.module_path, lifetime, dependency_count
        );
    }

    /// 检查服务是否已注册
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.inner
            .registrations
            .read()
            .contains_key(&TypeId::of::<T>())
    }

    /// 所有已注册服务的完整类型名称（已排序）
    pub fn registered_services(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .inner
            .registrations
            .read()
            .values()
            .map(|registration| registration.type_info.module_path)
            .collect();
        names.sort_unstable();
        names
    }

    // ========================================================================
    // 覆盖
    // ========================================================================

    /// 在构建前用另一个实现覆盖服务 `B`
    ///
    /// 未提供依赖列表时沿用 `B` 当前注册的依赖。构建时替换实现会被立即构造并放入
    /// `B` 的实例槽，此后 `B` 始终按共享方式解析。
    pub fn override_service<B, C, Args>(
        &self,
        constructor: C,
        dependencies: Option<Vec<Dependency>>,
    ) -> DependencyResult<()>
    where
        B: ?Sized + Send + Sync + 'static,
        C: Constructor<Args, Output = Arc<B>>,
    {
        let base = TypeInfo::of::<B>();
        let dependencies = self.override_dependencies(base, dependencies)?;
        let replacement = Registration::for_arc(constructor, dependencies, Lifetime::Shared)?;
        self.insert_override(base, replacement);
        Ok(())
    }

    /// 与 [`Container::override_service`] 相同，构造函数直接返回 `B`
    pub fn override_with<B, C, Args>(
        &self,
        constructor: C,
        dependencies: Option<Vec<Dependency>>,
    ) -> DependencyResult<()>
    where
        B: Send + Sync + 'static,
        C: Constructor<Args, Output = B>,
    {
        let base = TypeInfo::of::<B>();
        let dependencies = self.override_dependencies(base, dependencies)?;
        let replacement = Registration::for_value(constructor, dependencies, Lifetime::Shared)?;
        self.insert_override(base, replacement);
        Ok(())
    }

    fn override_dependencies(
        &self,
        base: TypeInfo,
        dependencies: Option<Vec<Dependency>>,
    ) -> DependencyResult<Vec<Dependency>> {
        if self.is_built() {
            return Err(DependencyError::OverrideAfterBuild {
                type_name: base.name.to_string(),
            });
        }

        match dependencies {
            Some(dependencies) => Ok(dependencies),
            None => self
                .inner
                .registrations
                .read()
                .get(&base.id)
                .map(|registration| registration.dependencies.clone())
                .ok_or_else(|| DependencyError::service_not_found(base.name)),
        }
    }

    fn insert_override(&self, base: TypeInfo, replacement: Registration) {
        self.inner.instances.write().remove(&base.id);

        let mut overrides = self.inner.overrides.lock();
        match overrides.iter_mut().find(|entry| entry.base == base) {
            Some(existing) => {
                warn!("服务覆盖被替换: {}", base.module_path);
                existing.replacement = replacement;
            }
            None => overrides.push(OverrideEntry { base, replacement }),
        }
        info!("登记服务覆盖: {}", base.module_path);
    }

    // ========================================================================
    // 构建
    // ========================================================================

    /// 构建容器
    ///
    /// 打开解析开关，应用所有覆盖，然后按添加顺序配置扩展。
    /// 再次调用只处理上次构建之后新增的扩展。
    pub fn build(&self) -> DependencyResult<()> {
        if self.inner.compiled.swap(true, Ordering::SeqCst) {
            warn!("容器已经构建过, 仅配置新增的扩展");
        } else {
            info!("开始构建容器");
        }

        self.apply_overrides()?;
        self.configure_extensions()?;

        let stats = self.stats();
        info!(
            "容器构建完成: {} 个服务, {} 个扩展",
            stats.registered_services, stats.extensions
        );
        Ok(())
    }

    /// 逐个应用覆盖，失败的覆盖及其后尚未应用的覆盖保留到下一次构建
    fn apply_overrides(&self) -> DependencyResult<()> {
        loop {
            let entry = {
                let mut overrides = self.inner.overrides.lock();
                if overrides.is_empty() {
                    return Ok(());
                }
                overrides.remove(0)
            };

            let instance = match self.construct_override(&entry) {
                Ok(instance) => instance,
                Err(e) => {
                    warn!("应用服务覆盖失败: {}, 原因: {}", entry.base.module_path, e);
                    self.inner.overrides.lock().insert(0, entry);
                    return Err(e);
                }
            };

            self.inner
                .registrations
                .write()
                .insert(entry.base.id, entry.replacement);
            self.inner.instances.write().insert(entry.base.id, instance);
            info!("已应用服务覆盖: {}", entry.base.module_path);
        }
    }

    fn construct_override(&self, entry: &OverrideEntry) -> DependencyResult<Instance> {
        let mut ctx = self.new_context();
        ctx.push_type(entry.base)?;
        let values = self.resolve_dependencies(&entry.replacement, &mut ctx)?;
        entry.replacement.construct(values)
    }

    // ========================================================================
    // 解析
    // ========================================================================

    /// 解析服务，未注册时返回 [`DependencyError::ServiceNotFound`]
    pub fn get<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>(true)?
            .ok_or_else(|| DependencyError::service_not_found(TypeInfo::of::<T>().name))
    }

    /// 解析服务
    ///
    /// `strict` 为 `false` 时未注册的服务返回 `Ok(None)`。
    /// 嵌套依赖总是严格解析。
    pub fn resolve<T>(&self, strict: bool) -> DependencyResult<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let type_info = TypeInfo::of::<T>();

        match self.resolve_erased(type_info, strict)? {
            Some(instance) => instance.downcast::<T>().map(Some).ok_or_else(|| {
                DependencyError::InstanceTypeMismatch {
                    type_name: type_info.module_path.to_string(),
                }
            }),
            None => Ok(None),
        }
    }

    /// 解析服务，未注册时返回 `Ok(None)`
    pub fn find<T>(&self) -> DependencyResult<Option<Arc<T>>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolve::<T>(false)
    }

    /// 按类型信息解析，返回类型擦除的实例
    pub(crate) fn resolve_erased(
        &self,
        type_info: TypeInfo,
        strict: bool,
    ) -> DependencyResult<Option<Instance>> {
        let mut ctx = self.new_context();
        self.resolve_instance(type_info, strict, &mut ctx)
    }

    fn new_context(&self) -> ResolveContext {
        ResolveContext::new(self.inner.config.resolve_options())
    }

    fn resolve_instance(
        &self,
        type_info: TypeInfo,
        strict: bool,
        ctx: &mut ResolveContext,
    ) -> DependencyResult<Option<Instance>> {
        if !self.is_built() {
            return Err(DependencyError::ContainerNotReady {
                type_name: type_info.name.to_string(),
            });
        }
        self.inner.resolutions.fetch_add(1, Ordering::Relaxed);

        let registration = self
            .inner
            .registrations
            .read()
            .get(&type_info.id)
            .cloned();
        let Some(registration) = registration else {
            if strict {
                return Err(DependencyError::service_not_found(type_info.name));
            }
            debug!("服务未注册, 返回空结果: {}", type_info.module_path);
            return Ok(None);
        };

        let shared = registration.lifetime.is_shared();
        if shared {
            let cached = self.inner.instances.read().get(&type_info.id).cloned();
            if let Some(cached) = cached {
                debug!("命中共享实例: {}", type_info.module_path);
                return Ok(Some(cached));
            }
        }

        ctx.push_type(type_info)?;
        let values = self.resolve_dependencies(&registration, ctx)?;
        let instance = registration.construct(values)?;
        ctx.pop_type();
        debug!("构造实例: {} ({})", type_info.module_path, registration.lifetime);

        if shared {
            let mut instances = self.inner.instances.write();
            return Ok(Some(instances.entry(type_info.id).or_insert(instance).clone()));
        }
        Ok(Some(instance))
    }

    /// 深度优先、从左到右解析依赖列表
    fn resolve_dependencies(
        &self,
        registration: &Registration,
        ctx: &mut ResolveContext,
    ) -> DependencyResult<Vec<Instance>> {
        registration
            .dependencies
            .iter()
            .map(|dependency| match dependency {
                Dependency::Service(target) => self
                    .resolve_instance(*target, true, ctx)?
                    .ok_or_else(|| DependencyError::service_not_found(target.name)),
                Dependency::Literal(value) => Ok(value.clone()),
            })
            .collect()
    }

    // ========================================================================
    // 统计
    // ========================================================================

    /// 获取容器统计信息
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            registered_services: self.inner.registrations.read().len(),
            active_singletons: self.inner.instances.read().len(),
            resolutions: self.inner.resolutions.load(Ordering::Relaxed),
            pending_overrides: self.inner.overrides.lock().len(),
            extensions: self.inner.extensions.lock().len(),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("built", &self.is_built())
            .field("stats", &self.stats())
            .finish()
    }
}
