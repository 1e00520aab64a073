//! Schema 构建与热替换抽象
//!
//! GraphQL 的解析和校验算法不在本 crate 范围内，由宿主通过 `SchemaBuilder`
//! 提供；运行中的服务通过 `SchemaHost` 接收新 schema。`LiveSchema` 是基于
//! ArcSwap 的现成 `SchemaHost` 实现：替换是整体原子替换，从不原地修改。

use std::sync::Arc;

use arc_swap::ArcSwap;

/// Schema 构建器：将合并后的 schema 文本构建为可执行的 schema 对象
///
/// # 示例
/// ```
/// use schemax::SchemaBuilder;
///
/// /// 示例实现：schema 对象就是 SDL 文本本身
/// struct SdlBuilder;
///
/// impl SchemaBuilder<String> for SdlBuilder {
///     fn build(&self, sdl: &str) -> anyhow::Result<String> {
///         Ok(sdl.to_string())
///     }
///
///     fn build_federated(&self, sdl: &str) -> anyhow::Result<String> {
///         Ok(format!("federated:{}", sdl))
///     }
/// }
/// ```
pub trait SchemaBuilder<S>: Send + Sync {
    /// 按标准模式构建 schema
    fn build(&self, sdl: &str) -> anyhow::Result<S>;

    /// 按 federation 模式构建 schema
    fn build_federated(&self, sdl: &str) -> anyhow::Result<S>;
}

/// 运行中的服务：接收重建后的新 schema
pub trait SchemaHost<S>: Send + Sync {
    /// 用新 schema 替换当前生效的 schema
    fn replace_schema(&self, schema: Arc<S>);
}

/// Schema 变更回调，参数与 `replace_schema` 收到的是同一个 Arc
pub type OnSchemaChange<S> = Box<dyn Fn(Arc<S>) + Send + Sync>;

/// 当前生效的 schema 持有者
///
/// 服务每次处理请求时通过 `load` 获取当前 schema；热重载时整体替换，
/// 正在使用旧 schema 的请求不受影响。
///
/// # 示例
/// ```
/// use std::sync::Arc;
/// use schemax::LiveSchema;
///
/// let live = LiveSchema::new("type A { id: ID }".to_string());
/// live.replace(Arc::new("type A { id: ID, name: String }".to_string()));
/// assert!(live.load().contains("name"));
/// ```
pub struct LiveSchema<S> {
    inner: ArcSwap<S>,
}

impl<S> LiveSchema<S> {
    /// 用初始 schema 创建
    pub fn new(schema: S) -> Self {
        Self {
            inner: ArcSwap::from_pointee(schema),
        }
    }

    /// 获取当前 schema
    pub fn load(&self) -> Arc<S> {
        self.inner.load_full()
    }

    /// 原子替换当前 schema
    pub fn replace(&self, schema: Arc<S>) {
        self.inner.store(schema);
    }
}

impl<S: Send + Sync> SchemaHost<S> for LiveSchema<S> {
    fn replace_schema(&self, schema: Arc<S>) {
        self.replace(schema);
    }
}
