//! 预构建缓存决策
//!
//! 启动时决定使用已有 artifact 还是重新从源文件加载。纯决策逻辑，
//! 自身不做任何 I/O（artifact 内容由调用方预先读取并传入）。
//!
//! 形状不合法的 artifact（不是数组、空数组、含非字符串元素）一律按缓存
//! 未命中处理，静默回退到源文件加载，永远不会报错。

use serde_json::Value as JsonValue;

use crate::error::SchemaError;
use crate::loader::SourceLoader;

/// 校验 artifact 内容
///
/// 仅当内容是非空的纯字符串数组时返回 Some，否则返回 None（缓存未命中）
pub(crate) fn validate_artifact(value: &JsonValue) -> Option<Vec<String>> {
    let array = value.as_array()?;
    if array.is_empty() {
        return None;
    }
    array
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// 解析启动时的 schema 文档列表
///
/// # 参数
/// - `prebuild_enabled`: 是否允许使用预构建的 artifact
/// - `artifact`: 启动时读到的 artifact 原始内容（可能不存在）
/// - `loader`: 缓存未命中时使用的源文件加载器
///
/// # 返回
/// - artifact 可用时原样返回其内容，不再读取源文件
/// - 否则委托给 `SourceLoader::load`
pub fn resolve_schema(
    prebuild_enabled: bool,
    artifact: Option<JsonValue>,
    loader: &SourceLoader,
) -> Result<Vec<String>, SchemaError> {
    if prebuild_enabled {
        if let Some(value) = artifact {
            if let Some(documents) = validate_artifact(&value) {
                log::debug!("using prebuilt schema artifact, {} documents", documents.len());
                return Ok(documents);
            }
            log::debug!("prebuilt schema artifact malformed, falling back to source files");
        }
    }

    loader.load()
}
