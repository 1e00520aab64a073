//! Schema 加载入口
//!
//! 串联各组件：启动时由 gate 决定使用 artifact 还是源文件；启用监听时
//! 通过控制器安装文件监听，变更后重建并热替换 schema。

use std::sync::Arc;

use crate::artifact::ArtifactStore;
use crate::builder::{OnSchemaChange, SchemaBuilder, SchemaHost};
use crate::error::SchemaError;
use crate::gate;
use crate::loader::SourceLoader;
use crate::options::LoadSchemaOptions;
use crate::watch::{self, WatchController, WatchTarget, WatcherHandle};

/// Schema 加载结果
pub struct LoadedSchema {
    /// 启动时得到的 schema 文档列表
    pub schema: Vec<String>,
    watcher: WatcherHandle,
}

impl LoadedSchema {
    /// 关闭文件监听；监听未启用时无任何效果
    pub fn close_watcher(&self) {
        self.watcher.close();
    }

    /// 监听句柄
    pub fn watcher_handle(&self) -> &WatcherHandle {
        &self.watcher
    }
}

/// 加载 schema 文件（使用进程级的全局监听控制器）
///
/// # 参数
/// - `options`: 加载选项
/// - `builder`: schema 构建器（监听触发重建时使用）
/// - `host`: 接收新 schema 的服务
/// - `on_change`: 可选的变更回调
///
/// # 返回
/// - 成功返回 `LoadedSchema`；没有任何可用 schema 时返回
///   `SchemaError::SchemaNotFound`，此时服务无 schema 可用，初始化应当中止
///
/// # 示例
/// ```no_run
/// use std::sync::Arc;
/// use schemax::{load_schema_files, LiveSchema, LoadSchemaOptions, SchemaBuilder};
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
/// let live = Arc::new(LiveSchema::new(String::new()));
/// let mut options = LoadSchemaOptions::new(["schema/*.graphql"]);
/// options.watch.enabled = true;
///
/// let loaded = load_schema_files(options, Arc::new(SdlBuilder), live, None).unwrap();
/// println!("loaded {} documents", loaded.schema.len());
///
/// // ... 服务关闭时 ...
/// loaded.close_watcher();
/// ```
pub fn load_schema_files<S>(
    options: LoadSchemaOptions,
    builder: Arc<dyn SchemaBuilder<S>>,
    host: Arc<dyn SchemaHost<S>>,
    on_change: Option<OnSchemaChange<S>>,
) -> Result<LoadedSchema, SchemaError>
where
    S: Send + Sync + 'static,
{
    load_schema_files_in(watch::global(), options, builder, host, on_change)
}

/// 加载 schema 文件（使用指定的监听控制器）
///
/// 与 [`load_schema_files`] 行为一致，监听安装到传入的控制器上，
/// 适合需要独立监听生命周期的场景和测试。
pub fn load_schema_files_in<S>(
    controller: &WatchController,
    options: LoadSchemaOptions,
    builder: Arc<dyn SchemaBuilder<S>>,
    host: Arc<dyn SchemaHost<S>>,
    on_change: Option<OnSchemaChange<S>>,
) -> Result<LoadedSchema, SchemaError>
where
    S: Send + Sync + 'static,
{
    let artifact = ArtifactStore::new(&options.artifact_path);
    let loader = SourceLoader::new(options.schema_path.clone(), artifact.clone());

    let schema = gate::resolve_schema(options.prebuild.is_enabled(), artifact.read_raw(), &loader)?;

    let watcher = if options.watch.enabled {
        controller.arm(WatchTarget {
            loader,
            builder,
            host,
            on_change,
            federation: options.federation,
            silent: options.silent,
            tuning: options.watch.tuning.clone(),
        })?
    } else {
        WatcherHandle::noop()
    };

    Ok(LoadedSchema { schema, watcher })
}
