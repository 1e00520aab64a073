//! 文件监听与热重载控制器
//!
//! 监听 schema glob 模式覆盖的文件，发生变更时重新加载源文件、重建 schema
//! 并原子替换到运行中的服务。
//!
//! 单例约束：每个 `WatchController` 同一时刻至多持有一个活跃的 OS 监听。
//! 重复 arm 时先关闭旧句柄再安装新句柄，避免宿主进程反复初始化时监听器
//! 越积越多。`load_schema_files` 使用进程级的全局控制器；测试可以创建
//! 独立实例。
//!
//! 事件处理不做防抖与合并：一次事件触发一轮完整的 加载 → 构建 → 替换，
//! N 个事件触发 N 轮。监听启动前已存在的文件不会产生事件（notify 不上报
//! 初始扫描），天然满足 ignore-initial 语义。

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam::channel::{unbounded, Receiver, Sender};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use once_cell::sync::Lazy;

use crate::builder::{OnSchemaChange, SchemaBuilder, SchemaHost};
use crate::error::SchemaError;
use crate::loader::SourceLoader;
use crate::options::WatchTuning;

/// 进程级的全局控制器
static GLOBAL_CONTROLLER: Lazy<WatchController> = Lazy::new(WatchController::new);

/// 获取全局监听控制器
pub fn global() -> &'static WatchController {
    &GLOBAL_CONTROLLER
}

/// 监听目标：事件触发后重建 schema 所需的全部上下文
///
/// federation 与 silent 在 arm 时固定，事件循环期间不再变化。
pub struct WatchTarget<S> {
    /// 变更后重新加载文档用的加载器（glob 模式也取自这里）
    pub loader: SourceLoader,
    /// Schema 构建器
    pub builder: Arc<dyn SchemaBuilder<S>>,
    /// 接收新 schema 的服务
    pub host: Arc<dyn SchemaHost<S>>,
    /// 可选的变更回调，收到的 Arc 与 host 收到的是同一个
    pub on_change: Option<OnSchemaChange<S>>,
    /// 是否按 federation 模式构建
    pub federation: bool,
    /// 不输出文件变更通知日志
    pub silent: bool,
    /// notify 调优参数
    pub tuning: WatchTuning,
}

/// 活跃监听的句柄
///
/// 可克隆共享；`close` 幂等，重复调用只有第一次生效。
/// 监听未启用时用 `noop` 句柄占位，close 调用无任何效果。
#[derive(Clone)]
pub struct WatcherHandle {
    inner: Arc<Mutex<HandleInner>>,
}

struct HandleInner {
    stop_tx: Option<Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl WatcherHandle {
    fn new(stop_tx: Sender<()>, thread: thread::JoinHandle<()>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HandleInner {
                stop_tx: Some(stop_tx),
                thread: Some(thread),
            })),
        }
    }

    /// 创建无操作句柄（监听未启用时的占位）
    pub fn noop() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HandleInner {
                stop_tx: None,
                thread: None,
            })),
        }
    }

    /// 关闭监听：停止后续事件投递并释放 OS 监听资源
    ///
    /// 已经开始处理的事件会完整执行完毕，close 会等待事件线程退出
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap();

        if let Some(stop_tx) = inner.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(thread) = inner.thread.take() {
            let _ = thread.join();
        }
    }

    /// 监听是否已关闭（noop 句柄视为已关闭）
    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().stop_tx.is_none()
    }
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// 监听控制器
///
/// 持有"当前活跃监听"槽位，保证同一控制器上至多一个活跃监听。
///
/// # 示例
/// ```no_run
/// use std::sync::Arc;
/// use schemax::{
///     ArtifactStore, LiveSchema, SchemaBuilder, SourceLoader, WatchController, WatchTarget,
///     WatchTuning,
/// };
///
/// struct SdlBuilder;
///
/// impl SchemaBuilder<String> for SdlBuilder {
///     fn build(&self, sdl: &str) -> anyhow::Result<String> {
///         Ok(sdl.to_string())
///     }
///
///     fn build_federated(&self, sdl: &str) -> anyhow::Result<String> {
///         Ok(sdl.to_string())
///     }
/// }
///
/// let controller = WatchController::new();
/// let live = Arc::new(LiveSchema::new(String::new()));
/// let handle = controller
///     .arm(WatchTarget {
///         loader: SourceLoader::new(
///             vec!["schema/*.graphql".to_string()],
///             ArtifactStore::new("schemax-schema.json"),
///         ),
///         builder: Arc::new(SdlBuilder),
///         host: live,
///         on_change: None,
///         federation: false,
///         silent: false,
///         tuning: WatchTuning::default(),
///     })
///     .unwrap();
///
/// // ... 服务运行 ...
/// handle.close();
/// ```
pub struct WatchController {
    slot: Mutex<Option<WatcherHandle>>,
}

impl WatchController {
    /// 创建独立的控制器
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// 安装文件监听
    ///
    /// 槽位中已有活跃监听时先将其关闭再安装新监听，新句柄随后发布到同一
    /// 槽位，供下一次 arm 找到并关闭。
    pub fn arm<S>(&self, target: WatchTarget<S>) -> Result<WatcherHandle, SchemaError>
    where
        S: Send + Sync + 'static,
    {
        // 提前编译匹配器，让模式错误在 arm 时报出而不是留到事件线程里
        let matchers = target
            .loader
            .patterns()
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let roots = watch_roots(target.loader.patterns());
        let notify_config = target.tuning.to_notify_config();

        // 持锁完成 关闭旧监听 → 安装新监听 的整个序列，串行化重复 arm
        let mut slot = self.slot.lock().unwrap();
        if let Some(prev) = slot.take() {
            prev.close();
        }

        let (stop_tx, stop_rx) = unbounded();
        let thread = thread::spawn(move || {
            run_event_loop(target, matchers, roots, notify_config, stop_rx);
        });

        let handle = WatcherHandle::new(stop_tx, thread);
        *slot = Some(handle.clone());

        Ok(handle)
    }

    /// 关闭当前活跃监听（如果有）
    pub fn disarm(&self) {
        if let Some(handle) = self.slot.lock().unwrap().take() {
            handle.close();
        }
    }
}

impl Default for WatchController {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 glob 模式推导需要安装 OS 监听的根目录
///
/// 取每个模式第一个通配符之前的目录前缀；模式不含通配符时监听其父目录
fn watch_roots(patterns: &[String]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let mut root = PathBuf::new();
        let mut truncated = false;

        for component in Path::new(pattern).components() {
            let text = component.as_os_str().to_string_lossy();
            if text.contains(|c| matches!(c, '*' | '?' | '[' | '{')) {
                truncated = true;
                break;
            }
            root.push(component);
        }

        if !truncated {
            root = root.parent().map(Path::to_path_buf).unwrap_or_default();
        }
        if root.as_os_str().is_empty() {
            root = PathBuf::from(".");
        }

        if !roots.contains(&root) {
            roots.push(root);
        }
    }

    roots
}

/// 判断事件路径是否命中任意 glob 模式
///
/// notify 上报的是绝对路径，相对模式需要剥掉工作目录前缀再匹配一次
fn matches_any(matchers: &[glob::Pattern], path: &Path) -> bool {
    if matchers.iter().any(|m| m.matches_path(path)) {
        return true;
    }

    if let Ok(cwd) = std::env::current_dir() {
        if let Ok(relative) = path.strip_prefix(&cwd) {
            return matchers.iter().any(|m| m.matches_path(relative));
        }
    }

    false
}

/// 事件种类的展示名；不关心的种类（如 access）返回 None
fn event_kind_name(kind: &notify::EventKind) -> Option<&'static str> {
    if kind.is_create() {
        Some("created")
    } else if kind.is_modify() {
        Some("modified")
    } else if kind.is_remove() {
        Some("removed")
    } else {
        None
    }
}

fn run_event_loop<S>(
    target: WatchTarget<S>,
    matchers: Vec<glob::Pattern>,
    roots: Vec<PathBuf>,
    notify_config: notify::Config,
    stop_rx: Receiver<()>,
) where
    S: Send + Sync + 'static,
{
    let (event_tx, event_rx) = unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            if let Ok(event) = res {
                let _ = event_tx.send(event);
            }
        },
        notify_config,
    ) {
        Ok(watcher) => watcher,
        Err(e) => {
            log::error!("failed to create file watcher: {}", e);
            return;
        }
    };

    for root in &roots {
        if let Err(e) = watcher.watch(root, RecursiveMode::Recursive) {
            log::error!("failed to watch {}: {}", root.display(), e);
        }
    }

    loop {
        crossbeam::select! {
            recv(stop_rx) -> _ => break,
            recv(event_rx) -> event => {
                match event {
                    Ok(event) => handle_event(&target, &matchers, &event),
                    Err(_) => break,
                }
            }
        }
    }

    // 显式 drop watcher 以释放 OS 监听资源
    drop(watcher);
}

fn handle_event<S>(target: &WatchTarget<S>, matchers: &[glob::Pattern], event: &notify::Event)
where
    S: Send + Sync + 'static,
{
    let Some(kind) = event_kind_name(&event.kind) else {
        return;
    };

    for path in &event.paths {
        if !matches_any(matchers, path) {
            continue;
        }

        if !target.silent {
            log::info!("{} {}, loading new schema...", path.display(), kind);
        }

        rebuild(target);
    }
}

/// 一轮完整的重建：加载 → 构建 → 替换 → 回调
///
/// 任一步失败都只记录日志并保留上一个可用的 schema，事件循环继续运行
fn rebuild<S>(target: &WatchTarget<S>)
where
    S: Send + Sync + 'static,
{
    let documents = match target.loader.load() {
        Ok(documents) => documents,
        Err(e) => {
            log::error!("schema reload failed, keeping last known good schema: {}", e);
            return;
        }
    };

    let sdl = documents.join("\n");
    let built = if target.federation {
        target.builder.build_federated(&sdl)
    } else {
        target.builder.build(&sdl)
    };

    let schema = match built {
        Ok(schema) => Arc::new(schema),
        Err(e) => {
            log::error!("schema build failed, keeping last known good schema: {:#}", e);
            return;
        }
    };

    target.host.replace_schema(schema.clone());

    if let Some(on_change) = &target.on_change {
        on_change(schema);
    }
}
