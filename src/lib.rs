//! Schemax - GraphQL schema 文件加载库
//!
//! 按 glob 模式加载 GraphQL schema 文件，可选地把文档列表缓存为磁盘
//! artifact 加速下次启动，可选地监听源文件变化热重载运行中服务的 schema。
//!
//! ## 模块
//!
//! - **loader**: 按 glob 模式加载 schema 源文件
//! - **artifact**: 文档列表的 JSON artifact 读写
//! - **gate**: 启动时的预构建缓存决策
//! - **watch**: 文件监听与热重载控制器
//! - **builder**: schema 构建与热替换的抽象（宿主实现）
//! - **load**: `load_schema_files` 入口
//!
//! ## 协作方
//!
//! GraphQL 的解析/校验、HTTP 服务循环均不在本库范围内，通过
//! `SchemaBuilder` / `SchemaHost` trait 由宿主接入。

pub mod artifact;
pub mod builder;
pub mod error;
pub mod gate;
pub mod load;
pub mod loader;
pub mod options;
pub mod watch;

// 重新导出主要的公共 API
pub use artifact::ArtifactStore;
pub use builder::{LiveSchema, OnSchemaChange, SchemaBuilder, SchemaHost};
pub use error::SchemaError;
pub use gate::resolve_schema;
pub use load::{load_schema_files, load_schema_files_in, LoadedSchema};
pub use loader::SourceLoader;
pub use options::{
    LoadSchemaOptions, PrebuildOptions, WatchOptions, WatchTuning, DEFAULT_ARTIFACT_PATH, ENV_KEY,
};
pub use watch::{WatchController, WatchTarget, WatcherHandle};
