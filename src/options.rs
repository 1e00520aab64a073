//! 配置选项
//!
//! 所有选项均可通过 serde 从 JSON/YAML 等配置反序列化，未指定的字段使用默认值。
//! 回调（如 onChange）不属于配置，作为参数单独传入 `load_schema_files`。

use serde::Deserialize;

/// 默认的 artifact 文件路径（相对于工作目录）
pub const DEFAULT_ARTIFACT_PATH: &str = "schemax-schema.json";

/// 判定当前是否为生产运行模式的环境变量
pub const ENV_KEY: &str = "SCHEMAX_ENV";

fn default_artifact_path() -> String {
    DEFAULT_ARTIFACT_PATH.to_string()
}

/// Schema 加载选项
///
/// # 示例
/// ```
/// use schemax::LoadSchemaOptions;
///
/// let options = LoadSchemaOptions::new(["schema/**/*.graphql"]);
/// assert!(!options.federation);
/// assert!(!options.watch.enabled);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LoadSchemaOptions {
    /// Schema 文件的 glob 模式（至少一个）
    pub schema_path: Vec<String>,

    /// 是否按 federation 模式构建 schema
    #[serde(default)]
    pub federation: bool,

    /// 文件监听选项
    #[serde(default)]
    pub watch: WatchOptions,

    /// 预构建缓存选项
    #[serde(default)]
    pub prebuild: PrebuildOptions,

    /// 不输出文件变更通知日志
    #[serde(default)]
    pub silent: bool,

    /// Artifact 文件路径
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,
}

impl LoadSchemaOptions {
    /// 使用给定的 glob 模式创建选项，其余字段取默认值
    pub fn new<I, P>(schema_path: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            schema_path: schema_path.into_iter().map(Into::into).collect(),
            federation: false,
            watch: WatchOptions::default(),
            prebuild: PrebuildOptions::default(),
            silent: false,
            artifact_path: default_artifact_path(),
        }
    }
}

/// 文件监听选项
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
    /// 是否启用文件监听（默认：false）
    pub enabled: bool,

    /// notify 监听器调优参数
    pub tuning: WatchTuning,
}

/// 监听器调优参数，透传给 notify
///
/// 不包含 ignore-initial 语义的开关：监听启动前已存在的文件不会触发事件，
/// 该行为是固定的。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WatchTuning {
    /// 轮询间隔（毫秒），仅对退化到轮询实现的平台生效
    pub poll_interval_ms: Option<u64>,

    /// 是否比较文件内容来过滤伪修改事件
    pub compare_contents: bool,
}

impl WatchTuning {
    /// 转换为 notify 的配置
    pub(crate) fn to_notify_config(&self) -> notify::Config {
        let mut config = notify::Config::default().with_compare_contents(self.compare_contents);
        if let Some(ms) = self.poll_interval_ms {
            config = config.with_poll_interval(std::time::Duration::from_millis(ms));
        }
        config
    }
}

/// 预构建缓存选项
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrebuildOptions {
    /// 是否启用预构建的 artifact
    ///
    /// 默认：仅当 `SCHEMAX_ENV=production` 时启用
    pub enabled: Option<bool>,
}

impl PrebuildOptions {
    /// 解析最终的启用状态
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or_else(|| {
            std::env::var(ENV_KEY).map(|v| v == "production").unwrap_or(false)
        })
    }
}
