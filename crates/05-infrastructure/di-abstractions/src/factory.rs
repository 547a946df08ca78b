//! 构造函数抽象
//!
//! 构造函数的参数数量由其签名推断，注册时与依赖列表长度比对。

use crate::registry::Instance;
use infrastructure_common::{DependencyError, TypeInfo};
use std::sync::Arc;

/// 已解析的构造参数
///
/// 按依赖声明的顺序排列，每一项都是类型擦除的实例。
#[derive(Debug)]
pub struct Arguments {
    owner: TypeInfo,
    values: Vec<Instance>,
}

impl Arguments {
    /// 创建参数列表
    pub fn new(owner: TypeInfo, values: Vec<Instance>) -> Self {
        Self { owner, values }
    }

    /// 参数数量
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否没有参数
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 按位置取出强类型参数
    pub fn get<A>(&self, position: usize) -> Result<Arc<A>, DependencyError>
    where
        A: ?Sized + Send + Sync + 'static,
    {
        let value = self
            .values
            .get(position)
            .ok_or_else(|| DependencyError::ArgumentCount {
                type_name: self.owner.name.to_string(),
                expected: position + 1,
                given: self.values.len(),
            })?;

        value
            .downcast::<A>()
            .ok_or_else(|| DependencyError::ArgumentTypeMismatch {
                type_name: self.owner.name.to_string(),
                position,
                expected: std::any::type_name::<A>().to_string(),
            })
    }
}

/// 构造函数 trait
///
/// 为 `Fn(Arc<A1>, ..., Arc<An>) -> O`（n <= 8）自动实现，
/// `Args` 只用于区分不同参数数量的实现。
pub trait Constructor<Args>: Send + Sync + 'static {
    /// 构造结果
    type Output;

    /// 参数数量
    fn arity(&self) -> usize;

    /// 使用已解析的参数构造实例
    fn construct(&self, args: &Arguments) -> Result<Self::Output, DependencyError>;
}

macro_rules! impl_constructor {
    (@count) => { 0usize };
    (@count $head:ident $($tail:ident)*) => { 1usize + impl_constructor!(@count $($tail)*) };
    ($($arg:ident => $idx:tt),*) => {
        impl<Func, Out, $($arg,)*> Constructor<($(Arc<$arg>,)*)> for Func
        where
            Func: Fn($(Arc<$arg>),*) -> Out + Send + Sync + 'static,
            $($arg: ?Sized + Send + Sync + 'static,)*
        {
            type Output = Out;

            fn arity(&self) -> usize {
                impl_constructor!(@count $($arg)*)
            }

            #[allow(unused_variables)]
            fn construct(&self, args: &Arguments) -> Result<Out, DependencyError> {
                Ok((self)($(args.get::<$arg>($idx)?),*))
            }
        }
    };
}

impl_constructor!();
impl_constructor!(A1 => 0);
impl_constructor!(A1 => 0, A2 => 1);
impl_constructor!(A1 => 0, A2 => 1, A3 => 2);
impl_constructor!(A1 => 0, A2 => 1, A3 => 2, A4 => 3);
impl_constructor!(A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4);
impl_constructor!(A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4, A6 => 5);
impl_constructor!(A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4, A6 => 5, A7 => 6);
impl_constructor!(A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4, A6 => 5, A7 => 6, A8 => 7);
