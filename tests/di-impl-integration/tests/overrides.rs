//! 服务覆盖


use common::{init_test_logger, Counter};
use di_impl::{Container, Dependency, DependencyError, Lifetime};
use std::sync::Arc;

trait Storage: Send + Sync {
    fn kind(&self) -> &'static str;

    fn counter(&self) -> &Arc<Counter>;
}

struct DiskStorage {
    counter: Arc<Counter>,
}

impl Storage for DiskStorage {
    fn kind(&self) -> &'static str {
        "disk"
    }

    fn counter(&self) -> &Arc<Counter> {
        &self.counter
    }
}

struct MemoryStorage {
    counter: Arc<Counter>,
}

impl Storage for MemoryStorage {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn counter(&self) -> &Arc<Counter> {
        &self.counter
    }
}

fn disk(counter: Arc<Counter>) -> Arc<dyn Storage> {
    Arc::new(DiskStorage { counter })
}

fn memory(counter: Arc<Counter>) -> Arc<dyn Storage> {
    counter.bump();
    Arc::new(MemoryStorage { counter })
}

#[derive(Debug)]
struct Greeting(String);

#[derive(Debug)]
struct Retries(u32);

#[derive(Debug)]
struct Endpoint(String);

fn container_with_disk_storage() -> Container {
    let container = Container::new();
    container.singleton(Counter::default, vec![]).unwrap();
    container
        .register_arc(
            disk,
            vec![Dependency::service::<Counter>()],
            Lifetime::Transient,
        )
        .unwrap();
    container
}

#[test]
fn test_override_substitutes_implementation() {
    init_test_logger();
    let container = container_with_disk_storage();
    container
        .override_service::<dyn Storage, _, _>(memory, None)
        .unwrap();
    container.build().unwrap();

    let storage = container.get::<dyn Storage>().unwrap();
    assert_eq!(storage.kind(), "memory");

    let counter = container.get::<Counter>().unwrap();
    assert!(Arc::ptr_eq(storage.counter(), &counter));
}

#[test]
fn test_override_is_always_shared() {
    init_test_logger();
    let container = container_with_disk_storage();
    container
        .override_service::<dyn Storage, _, _>(memory, None)
        .unwrap();
    container.build().unwrap();

    let first = container.get::<dyn Storage>().unwrap();
    let second = container.get::<dyn Storage>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // 替换实现在构建时构造一次
    assert_eq!(container.get::<Counter>().unwrap().value(), 1);
}

#[test]
fn test_override_after_build_fails() {
    init_test_logger();
    let container = container_with_disk_storage();
    container.build().unwrap();

    let err = container
        .override_service::<dyn Storage, _, _>(memory, None)
        .unwrap_err();
    assert!(matches!(err, DependencyError::OverrideAfterBuild { .. }));
    assert_eq!(container.get::<dyn Storage>().unwrap().kind(), "disk");
}

#[test]
fn test_override_with_explicit_dependencies() {
    init_test_logger();
    let container = Container::new();
    container
        .singleton(
            |text: Arc<&'static str>| Greeting(text.to_string()),
            vec![Dependency::literal("hello")],
        )
        .unwrap();
    container
        .override_with(
            |text: Arc<&'static str>| Greeting(text.to_uppercase()),
            Some(vec![Dependency::literal("bonjour")]),
        )
        .unwrap();
    container.build().unwrap();

    assert_eq!(container.get::<Greeting>().unwrap().0, "BONJOUR");
}

#[test]
fn test_override_of_unregistered_base_needs_dependencies() {
    init_test_logger();
    let container = Container::new();

    let err = container
        .override_service::<dyn Storage, _, _>(memory, None)
        .unwrap_err();
    assert!(matches!(err, DependencyError::ServiceNotFound { .. }));

    container.singleton(Counter::default, vec![]).unwrap();
    container
        .override_service::<dyn Storage, _, _>(
            memory,
            Some(vec![Dependency::service::<Counter>()]),
        )
        .unwrap();
    container.build().unwrap();
    assert_eq!(container.get::<dyn Storage>().unwrap().kind(), "memory");
}

#[test]
fn test_last_override_wins() {
    init_test_logger();
    let container = container_with_disk_storage();
    container
        .override_service::<dyn Storage, _, _>(memory, None)
        .unwrap();
    container
        .override_service::<dyn Storage, _, _>(disk, None)
        .unwrap();
    assert_eq!(container.stats().pending_overrides, 1);

    container.build().unwrap();
    assert_eq!(container.get::<dyn Storage>().unwrap().kind(), "disk");
    assert_eq!(container.stats().pending_overrides, 0);
}

#[test]
fn test_build_retry_applies_remaining_overrides() {
    init_test_logger();
    let container = Container::new();
    container
        .singleton(
            |host: Arc<&'static str>| Endpoint(host.to_string()),
            vec![Dependency::literal("localhost")],
        )
        .unwrap();
    container
        .singleton(|n: Arc<u32>| Retries(*n), vec![Dependency::literal(1u32)])
        .unwrap();

    // 依赖 Greeting，但 Greeting 尚未注册
    container
        .override_with(
            |greeting: Arc<Greeting>| Endpoint(greeting.0.clone()),
            Some(vec![Dependency::service::<Greeting>()]),
        )
        .unwrap();
    container
        .override_with(|n: Arc<u32>| Retries(*n), Some(vec![Dependency::literal(2u32)]))
        .unwrap();

    let err = container.build().unwrap_err();
    assert!(matches!(err, DependencyError::ServiceNotFound { .. }));
    assert_eq!(container.stats().pending_overrides, 2);
    assert_eq!(container.get::<Retries>().unwrap().0, 1);

    container
        .singleton(
            |text: Arc<&'static str>| Greeting(text.to_string()),
            vec![Dependency::literal("example.org")],
        )
        .unwrap();
    container.build().unwrap();

    assert_eq!(container.stats().pending_overrides, 0);
    assert_eq!(container.get::<Endpoint>().unwrap().0, "example.org");
    assert_eq!(container.get::<Retries>().unwrap().0, 2);
}
