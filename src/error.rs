//! 错误类型定义
//!
//! Schema 加载相关的错误，区分致命错误和仅记录日志的错误：
//! - 找不到 schema 文件是致命错误，必须向调用方传播
//! - Artifact 读写失败只记录日志，永远不会传播（见 artifact 模块）
//! - Artifact 内容格式错误不是错误，按缓存未命中处理（见 gate 模块）

use thiserror::Error;

/// Schema 加载错误
#[derive(Error, Debug)]
pub enum SchemaError {
    /// 按 glob 模式没有找到任何可用的 schema 文件
    ///
    /// 匹配到的文件全部为空（trim 后）时也会返回该错误
    #[error("no GraphQL schema files found, patterns: {patterns:?}")]
    SchemaNotFound {
        /// 查找时使用的 glob 模式
        patterns: Vec<String>,
    },

    /// glob 模式本身非法
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// 读取 schema 文件失败
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema 构建失败（由外部 SchemaBuilder 报告）
    #[error("schema build failed: {0}")]
    Build(#[source] anyhow::Error),

    /// 文件监听器错误
    #[error("watcher error: {0}")]
    Watcher(String),
}
