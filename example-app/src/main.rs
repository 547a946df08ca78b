//! # 示例应用程序
//!
//! 演示如何使用 Lorn DI 容器：从配置文件加载容器配置、注册服务、
//! 覆盖实现、添加扩展包并解析服务。

use clap::Parser;
use di_abstractions::ContainerConfig;
use di_impl::{Bundle, Container, Dependency, DependencyResult, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{error, info};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "container-demo")]
#[command(about = "Lorn DI 示例应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "config/app.toml")]
    config: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 使用 JSON 格式输出日志
    #[arg(long)]
    json: bool,

    /// 使用内存仓储替换默认仓储
    #[arg(long)]
    in_memory: bool,

    /// 模拟的请求数量
    #[arg(short, long, default_value_t = 3)]
    requests: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let mut logging = LoggingConfig::default().with_level_name(&args.log_level);
    logging.json_format = args.json;
    logging.try_init()?;

    info!("启动 Lorn DI 示例应用");

    let container = build_container(&args)?;
    demonstrate_resolution(&container, args.requests)?;
    demonstrate_extension(&container)?;

    info!("容器统计: {:?}", container.stats());
    info!("应用已退出");
    Ok(())
}

/// 构建容器
fn build_container(args: &Args) -> Result<Container, Box<dyn std::error::Error + Send + Sync>> {
    let path = Path::new(&args.config);
    let config = if path.exists() {
        ContainerConfig::load(Some(path))?
    } else {
        info!("配置文件不存在，将使用默认配置和环境变量");
        ContainerConfig::load(None)?
    };

    let container = Container::with_config(config);

    container.singleton(RequestCounter::default, vec![])?;
    container.singleton_arc(
        |counter: Arc<RequestCounter>| Arc::new(FileRepository { counter }) as Arc<dyn Repository>,
        vec![Dependency::service::<RequestCounter>()],
    )?;
    container.transient(
        |repository: Arc<dyn Repository>, counter: Arc<RequestCounter>| RequestHandler {
            id: counter.next(),
            repository,
        },
        vec![
            Dependency::service::<dyn Repository>(),
            Dependency::service::<RequestCounter>(),
        ],
    )?;

    if args.in_memory {
        container.override_service::<dyn Repository, _, _>(
            |_: Arc<RequestCounter>| Arc::new(MemoryRepository) as Arc<dyn Repository>,
            None,
        )?;
    }

    container.add_configured_extension::<GreeterBundle>()?;
    container.build()?;

    info!("已注册服务: {:?}", container.registered_services());
    Ok(container)
}

/// 演示服务解析
fn demonstrate_resolution(container: &Container, requests: usize) -> DependencyResult<()> {
    info!("演示服务解析功能");

    for _ in 0..requests {
        let handler = container.get::<RequestHandler>()?;
        handler.handle();
    }

    let counter = container.get::<RequestCounter>()?;
    info!("共处理 {} 个请求", counter.current());

    match container.get_parameter("environment") {
        Ok(environment) => info!("运行环境: {}", environment),
        Err(e) => info!("未配置运行环境: {}", e),
    }

    if container.find::<AuditLog>()?.is_none() {
        info!("AuditLog 未注册");
    }
    Ok(())
}

/// 演示扩展包
fn demonstrate_extension(container: &Container) -> DependencyResult<()> {
    info!("演示扩展包功能");

    match container.get_extension_by_name::<GreeterBundle>("GreeterBundle")? {
        Some(bundle) => info!("扩展已加载, 配置过 {} 次", bundle.configured_times()),
        None => error!("扩展 GreeterBundle 未加载"),
    }

    let greeter = container.get::<Greeter>()?;
    for line in greeter.greet("Lorn") {
        info!("{}", line);
    }
    Ok(())
}

// 示例服务

/// 请求计数器
#[derive(Debug, Default)]
pub struct RequestCounter {
    count: AtomicUsize,
}

impl RequestCounter {
    /// 分配下一个请求编号
    pub fn next(&self) -> usize {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 当前请求数
    pub fn current(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// 仓储
pub trait Repository: Send + Sync {
    /// 仓储名称
    fn name(&self) -> &'static str;
}

/// 文件仓储
pub struct FileRepository {
    counter: Arc<RequestCounter>,
}

impl Repository for FileRepository {
    fn name(&self) -> &'static str {
        if self.counter.current() > 0 {
            "file"
        } else {
            "file (idle)"
        }
    }
}

/// 内存仓储
pub struct MemoryRepository;

impl Repository for MemoryRepository {
    fn name(&self) -> &'static str {
        "memory"
    }
}

/// 请求处理器
pub struct RequestHandler {
    id: usize,
    repository: Arc<dyn Repository>,
}

impl RequestHandler {
    /// 处理请求
    pub fn handle(&self) {
        info!("请求 #{} 使用 {} 仓储处理", self.id, self.repository.name());
    }
}

/// 从未注册的审计日志
pub struct AuditLog;

// 示例扩展包

/// 问候扩展配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreeterConfig {
    /// 问候语
    pub greeting: String,
    /// 重复次数
    pub repeat: usize,
}

impl Default for GreeterConfig {
    fn default() -> Self {
        Self {
            greeting: "Hello".to_string(),
            repeat: 1,
        }
    }
}

/// 问候服务
#[derive(Debug)]
pub struct Greeter {
    config: GreeterConfig,
}

impl Greeter {
    /// 生成问候语
    pub fn greet(&self, name: &str) -> Vec<String> {
        (0..self.config.repeat)
            .map(|_| format!("{}, {}!", self.config.greeting, name))
            .collect()
    }
}

/// 问候扩展包
#[derive(Debug, Default)]
pub struct GreeterBundle {
    configured: AtomicUsize,
}

impl GreeterBundle {
    /// 被配置的次数
    pub fn configured_times(&self) -> usize {
        self.configured.load(Ordering::SeqCst)
    }
}

impl Bundle for GreeterBundle {
    type Config = GreeterConfig;

    fn configure(
        self: Arc<Self>,
        container: &Container,
        config: Option<&GreeterConfig>,
    ) -> DependencyResult<()> {
        self.configured.fetch_add(1, Ordering::SeqCst);
        let config = config.cloned().unwrap_or_default();
        container.singleton(
            |config: Arc<GreeterConfig>| Greeter {
                config: (*config).clone(),
            },
            vec![Dependency::literal(config)],
        )?;
        container.instance(self);
        Ok(())
    }
}
