//! Artifact 存储
//!
//! 将 schema 文档列表持久化为磁盘上的 JSON artifact，供下次启动时直接使用。
//! 纯 I/O，不包含缓存决策逻辑（决策见 gate 模块）。
//!
//! 写入策略：
//! - artifact 不存在时直接写入
//! - 已存在时先读取比较，内容完全一致则跳过写入（幂等，避免多余的磁盘写入
//!   和对外部工具的伪文件变更通知）
//! - 持久化失败只记录日志，永远不会传播给调用方
//!
//! 已知并发竞争：读取-比较-写入不是事务性的，多个进程同时写时后写者胜出。
//! artifact 只是启动加速缓存而非数据源，可以接受。

use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result};
use serde_json::Value as JsonValue;

/// Artifact 存储
///
/// # 示例
/// ```no_run
/// use schemax::ArtifactStore;
///
/// let store = ArtifactStore::new("schemax-schema.json");
/// if let Some(documents) = store.read() {
///     println!("cached documents: {}", documents.len());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    /// 创建指向给定路径的 artifact 存储
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// artifact 文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取 artifact 的原始 JSON 内容
    ///
    /// 文件不存在或不是合法 JSON 时返回 None，形状校验由 gate 模块负责
    pub fn read_raw(&self) -> Option<JsonValue> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// 读取并校验 artifact，仅当内容是非空字符串数组时返回
    pub fn read(&self) -> Option<Vec<String>> {
        let documents: Vec<String> = serde_json::from_value(self.read_raw()?).ok()?;
        if documents.is_empty() {
            return None;
        }
        Some(documents)
    }

    /// 持久化文档列表
    ///
    /// 序列化为 2 空格缩进的 JSON 字符串数组，便于逐次运行间做字节级比较。
    /// 已有内容完全一致时跳过写入。
    pub fn persist(&self, documents: &[String]) -> Result<()> {
        let serialized = serde_json::to_string_pretty(documents)
            .context("failed to serialize schema documents")?;

        if self.path.exists() {
            let existing = std::fs::read_to_string(&self.path)
                .with_context(|| format!("failed to read artifact: {}", self.path.display()))?;
            if existing == serialized {
                log::debug!("artifact unchanged, skip write: {}", self.path.display());
                return Ok(());
            }
        }

        std::fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write artifact: {}", self.path.display()))?;
        log::debug!("artifact written: {}", self.path.display());

        Ok(())
    }

    /// 在后台线程中持久化，失败只记录日志
    ///
    /// 调用方的返回值不依赖该写入的完成或成功。返回的 JoinHandle 通常直接丢弃，
    /// 测试中可以 join 等待写入完成。
    pub fn persist_detached(&self, documents: Vec<String>) -> thread::JoinHandle<()> {
        let store = self.clone();
        thread::spawn(move || {
            if let Err(e) = store.persist(&documents) {
                log::error!("artifact persist failed: {:#}", e);
            }
        })
    }
}
