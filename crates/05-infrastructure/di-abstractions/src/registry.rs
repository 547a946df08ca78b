//! 服务注册描述符
//!
//! 描述一个服务如何被构造：依赖列表、生命周期与工厂函数。

use crate::factory::{Arguments, Constructor};
use infrastructure_common::{DependencyError, Lifetime, TypeInfo};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 类型擦除的服务实例
///
/// 内部保存一个 `Arc<T>`，`T` 可以是 `dyn Trait`。
/// 克隆只增加引用计数，取出的 `Arc<T>` 始终指向同一个对象。
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_info: TypeInfo,
}

impl Instance {
    /// 包装一个已共享的服务
    pub fn new<T>(service: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            value: Arc::new(service),
            type_info: TypeInfo::of::<T>(),
        }
    }

    /// 包装一个普通值
    pub fn from_value<T>(value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::new(Arc::new(value))
    }

    /// 取出强类型的服务
    pub fn downcast<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }

    /// 实例的类型信息
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.type_info.module_path)
            .finish()
    }
}

/// 依赖声明
///
/// 依赖列表中的每一项要么引用另一个已注册的服务，要么是原样注入的字面量。
#[derive(Clone)]
pub enum Dependency {
    /// 递归解析的服务引用
    Service(TypeInfo),
    /// 原样传入构造函数的字面量
    Literal(Instance),
}

impl Dependency {
    /// 引用服务 `T`
    pub fn service<T: ?Sized + 'static>() -> Self {
        Self::Service(TypeInfo::of::<T>())
    }

    /// 字面量依赖，构造函数以 `Arc<V>` 接收
    pub fn literal<V: Send + Sync + 'static>(value: V) -> Self {
        Self::Literal(Instance::from_value(value))
    }

    /// 已共享的字面量依赖
    pub fn literal_arc<V: ?Sized + Send + Sync + 'static>(value: Arc<V>) -> Self {
        Self::Literal(Instance::new(value))
    }

    /// 是否引用了指定类型
    pub fn refers_to(&self, type_info: &TypeInfo) -> bool {
        matches!(self, Self::Service(target) if target == type_info)
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service(target) => write!(f, "Service({})", target.module_path),
            Self::Literal(value) => write!(f, "Literal({})", value.type_info().module_path),
        }
    }
}

/// 服务工厂函数类型
pub type ServiceFactory =
    Arc<dyn Fn(&Arguments) -> Result<Instance, DependencyError> + Send + Sync>;

/// 服务注册信息
#[derive(Clone)]
pub struct Registration {
    /// 服务类型
    pub type_info: TypeInfo,
    /// 有序依赖列表
    pub dependencies: Vec<Dependency>,
    /// 生命周期
    pub lifetime: Lifetime,
    /// 构造函数声明的参数数量
    pub arity: usize,
    /// 工厂函数
    pub factory: ServiceFactory,
}

impl Registration {
    /// 由返回 `T` 的构造函数创建注册信息
    pub fn for_value<T, C, Args>(
        constructor: C,
        dependencies: Vec<Dependency>,
        lifetime: Lifetime,
    ) -> Result<Self, DependencyError>
    where
        T: Send + Sync + 'static,
        C: Constructor<Args, Output = T>,
    {
        let arity = constructor.arity();
        let factory: ServiceFactory = Arc::new(move |args: &Arguments| {
            constructor.construct(args).map(Instance::from_value)
        });
        Self::from_factory(TypeInfo::of::<T>(), arity, factory, dependencies, lifetime)
    }

    /// 由返回 `Arc<T>` 的构造函数创建注册信息，`T` 可以是 trait 对象
    pub fn for_arc<T, C, Args>(
        constructor: C,
        dependencies: Vec<Dependency>,
        lifetime: Lifetime,
    ) -> Result<Self, DependencyError>
    where
        T: ?Sized + Send + Sync + 'static,
        C: Constructor<Args, Output = Arc<T>>,
    {
        let arity = constructor.arity();
        let factory: ServiceFactory =
            Arc::new(move |args: &Arguments| constructor.construct(args).map(Instance::new));
        Self::from_factory(TypeInfo::of::<T>(), arity, factory, dependencies, lifetime)
    }

    /// 注册一个已构造好的共享实例
    pub fn for_instance<T>(service: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let instance = Instance::new(service);
        let factory: ServiceFactory = Arc::new(move |_: &Arguments| Ok(instance.clone()));
        Self {
            type_info: TypeInfo::of::<T>(),
            dependencies: Vec::new(),
            lifetime: Lifetime::Shared,
            arity: 0,
            factory,
        }
    }

    /// 由工厂函数创建注册信息并校验
    pub fn from_factory(
        type_info: TypeInfo,
        arity: usize,
        factory: ServiceFactory,
        dependencies: Vec<Dependency>,
        lifetime: Lifetime,
    ) -> Result<Self, DependencyError> {
        let registration = Self {
            type_info,
            dependencies,
            lifetime,
            arity,
            factory,
        };
        registration.validate()?;
        Ok(registration)
    }

    /// 校验自依赖与参数数量
    pub fn validate(&self) -> Result<(), DependencyError> {
        if self
            .dependencies
            .iter()
            .any(|dep| dep.refers_to(&self.type_info))
        {
            return Err(DependencyError::CyclicalDependency {
                dependency_chain: format!("{0} -> {0}", self.type_info.name),
            });
        }

        if self.dependencies.len() != self.arity {
            return Err(DependencyError::ArgumentCount {
                type_name: self.type_info.name.to_string(),
                expected: self.arity,
                given: self.dependencies.len(),
            });
        }

        Ok(())
    }

    /// 使用解析好的参数调用工厂
    pub fn construct(&self, values: Vec<Instance>) -> Result<Instance, DependencyError> {
        let args = Arguments::new(self.type_info, values);
        (self.factory)(&args)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("type_info", &self.type_info.module_path)
            .field("dependencies", &self.dependencies)
            .field("lifetime", &self.lifetime)
            .field("arity", &self.arity)
            .field("factory", &"<function>")
            .finish()
    }
}
