//! Schema 源文件加载器
//!
//! 按 glob 模式从磁盘读取 schema 文件，产出有序的文档列表。
//! 加载成功后会触发一次后台的 artifact 持久化（fire-and-forget），
//! 返回值不依赖持久化结果。

use glob::glob;

use crate::artifact::ArtifactStore;
use crate::error::SchemaError;

/// Schema 源文件加载器
///
/// 文档顺序为 glob 枚举顺序（同一模式内按路径字典序），多个模式按传入顺序拼接。
/// 顺序决定了 artifact 的字节级可比较性，必须保持稳定。
///
/// # 示例
/// ```no_run
/// use schemax::{ArtifactStore, SourceLoader};
///
/// let loader = SourceLoader::new(
///     vec!["schema/**/*.graphql".to_string()],
///     ArtifactStore::new("schemax-schema.json"),
/// );
/// let documents = loader.load().unwrap();
/// assert!(!documents.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct SourceLoader {
    patterns: Vec<String>,
    artifact: ArtifactStore,
}

impl SourceLoader {
    /// 创建加载器
    ///
    /// # 参数
    /// - `patterns`: schema 文件的 glob 模式
    /// - `artifact`: 加载成功后用来持久化文档列表的 artifact 存储
    pub fn new(patterns: Vec<String>, artifact: ArtifactStore) -> Self {
        Self { patterns, artifact }
    }

    /// glob 模式
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// 从磁盘加载 schema 文档列表
    ///
    /// # 返回
    /// - 成功返回非空的文档列表，每个元素是 trim 后的完整文件内容
    /// - 没有任何可用文档时返回 `SchemaError::SchemaNotFound`
    /// - glob 模式非法或文件读取失败时返回对应错误
    pub fn load(&self) -> Result<Vec<String>, SchemaError> {
        let mut documents = Vec::new();

        for pattern in &self.patterns {
            for entry in glob(pattern)? {
                let path = entry.map_err(|e| e.into_error())?;
                if !path.is_file() {
                    continue;
                }

                let content = std::fs::read_to_string(&path)?;
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    log::debug!("skip empty schema file: {}", path.display());
                    continue;
                }

                documents.push(trimmed.to_string());
            }
        }

        if documents.is_empty() {
            return Err(SchemaError::SchemaNotFound {
                patterns: self.patterns.clone(),
            });
        }

        // 后台持久化 artifact，失败不影响返回值
        let _ = self.artifact.persist_detached(documents.clone());

        Ok(documents)
    }
}
