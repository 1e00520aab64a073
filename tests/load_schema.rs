//! load_schema_files 端到端测试
//!
//! 覆盖启动加载、artifact 预构建缓存、缓存失效回退和热重载场景。
//! 监听相关的用例使用独立的 WatchController，避免全局状态相互干扰。

use std::fs;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use schemax::{
    load_schema_files_in, LoadSchemaOptions, SchemaBuilder, SchemaHost, WatchController,
};

/// schema 对象即 SDL 文本；联邦构建加前缀以便区分构建路径
struct SdlBuilder;

impl SchemaBuilder<String> for SdlBuilder {
    fn build(&self, sdl: &str) -> anyhow::Result<String> {
        Ok(sdl.to_string())
    }

    fn build_federated(&self, sdl: &str) -> anyhow::Result<String> {
        Ok(format!("federated:{}", sdl))
    }
}

/// 记录每次 replace_schema 调用的宿主
#[derive(Default)]
struct RecordingHost {
    replaced: Mutex<Vec<Arc<String>>>,
}

impl SchemaHost<String> for RecordingHost {
    fn replace_schema(&self, schema: Arc<String>) {
        self.replaced.lock().unwrap().push(schema);
    }
}

fn options_for(temp_dir: &TempDir) -> LoadSchemaOptions {
    let mut options = LoadSchemaOptions::new([format!(
        "{}/*.graphql",
        temp_dir.path().display()
    )]);
    options.artifact_path = temp_dir
        .path()
        .join("schemax-schema.json")
        .to_string_lossy()
        .to_string();
    options.silent = true;
    options
}

/// 两个源文件、无 artifact：按序加载并生成 artifact
#[test]
fn test_load_from_source_creates_artifact() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.graphql"), "type A { id: ID }").unwrap();
    fs::write(temp_dir.path().join("b.graphql"), "type B { id: ID }").unwrap();

    let options = options_for(&temp_dir);
    let artifact_path = options.artifact_path.clone();

    let controller = WatchController::new();
    let loaded = load_schema_files_in(
        &controller,
        options,
        Arc::new(SdlBuilder),
        Arc::new(RecordingHost::default()),
        None,
    )
    .unwrap();

    assert_eq!(
        loaded.schema,
        vec!["type A { id: ID }".to_string(), "type B { id: ID }".to_string()]
    );

    // artifact 在后台线程写入
    thread::sleep(Duration::from_millis(300));
    let content = fs::read_to_string(&artifact_path).unwrap();
    assert_eq!(
        content,
        "[\n  \"type A { id: ID }\",\n  \"type B { id: ID }\"\n]"
    );

    // 监听未启用：close_watcher 是空操作
    loaded.close_watcher();
}

/// 合法 artifact + prebuild 启用：直接使用缓存，不读源文件
#[test]
fn test_prebuilt_artifact_skips_source() {
    let temp_dir = TempDir::new().unwrap();
    // 源文件与 artifact 内容不同，用来证明没有读源文件
    fs::write(temp_dir.path().join("a.graphql"), "type FromDisk { id: ID }").unwrap();

    let mut options = options_for(&temp_dir);
    options.prebuild.enabled = Some(true);
    fs::write(&options.artifact_path, r#"["type A { id: ID }"]"#).unwrap();

    let controller = WatchController::new();
    let loaded = load_schema_files_in(
        &controller,
        options,
        Arc::new(SdlBuilder),
        Arc::new(RecordingHost::default()),
        None,
    )
    .unwrap();

    assert_eq!(loaded.schema, vec!["type A { id: ID }".to_string()]);
}

/// prebuild 关闭时 artifact 被忽略
#[test]
fn test_prebuild_disabled_reads_source() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.graphql"), "type FromDisk { id: ID }").unwrap();

    let mut options = options_for(&temp_dir);
    options.prebuild.enabled = Some(false);
    fs::write(&options.artifact_path, r#"["type A { id: ID }"]"#).unwrap();

    let controller = WatchController::new();
    let loaded = load_schema_files_in(
        &controller,
        options,
        Arc::new(SdlBuilder),
        Arc::new(RecordingHost::default()),
        None,
    )
    .unwrap();

    assert_eq!(loaded.schema, vec!["type FromDisk { id: ID }".to_string()]);
}

/// 监听启用时文件变更：replace_schema 收到用新文本构建的 schema，
/// onChange 收到同一个对象
#[test]
fn test_watch_rebuilds_and_swaps() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("a.graphql");
    fs::write(&file_path, "type A { id: ID }").unwrap();

    let mut options = options_for(&temp_dir);
    options.watch.enabled = true;

    let host = Arc::new(RecordingHost::default());
    let notified: Arc<Mutex<Vec<Arc<String>>>> = Arc::new(Mutex::new(Vec::new()));
    let notified_clone = notified.clone();

    let controller = WatchController::new();
    let loaded = load_schema_files_in(
        &controller,
        options,
        Arc::new(SdlBuilder),
        host.clone(),
        Some(Box::new(move |schema| {
            notified_clone.lock().unwrap().push(schema);
        })),
    )
    .unwrap();

    assert_eq!(loaded.schema, vec!["type A { id: ID }".to_string()]);

    // 等待监听器安装完成
    thread::sleep(Duration::from_millis(300));

    fs::write(&file_path, "type A { id: ID, name: String }").unwrap();

    // 等待事件触发与重建完成
    thread::sleep(Duration::from_millis(800));

    let replaced = host.replaced.lock().unwrap();
    let notified = notified.lock().unwrap();
    assert!(
        replaced.iter().any(|s| s.contains("name: String")),
        "replace_schema 应该收到用新文本构建的 schema"
    );
    assert_eq!(replaced.len(), notified.len());
    for (a, b) in replaced.iter().zip(notified.iter()) {
        assert!(Arc::ptr_eq(a, b), "onChange 收到的应该是 replace_schema 的同一个对象");
    }
    drop(replaced);
    drop(notified);

    loaded.close_watcher();
    assert!(loaded.watcher_handle().is_closed());
}

/// artifact 内容为 `{}`：回退到源文件加载并覆盖损坏的 artifact
#[test]
fn test_malformed_artifact_falls_back_and_overwrites() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.graphql"), "type A { id: ID }").unwrap();

    let mut options = options_for(&temp_dir);
    options.prebuild.enabled = Some(true);
    fs::write(&options.artifact_path, "{}").unwrap();
    let artifact_path = options.artifact_path.clone();

    let controller = WatchController::new();
    let loaded = load_schema_files_in(
        &controller,
        options,
        Arc::new(SdlBuilder),
        Arc::new(RecordingHost::default()),
        None,
    )
    .unwrap();

    assert_eq!(loaded.schema, vec!["type A { id: ID }".to_string()]);

    thread::sleep(Duration::from_millis(300));
    let content = fs::read_to_string(&artifact_path).unwrap();
    assert_eq!(content, "[\n  \"type A { id: ID }\"\n]");
}

/// 没有任何可用 schema 文件时启动失败
#[test]
fn test_startup_fails_without_schema_files() {
    let temp_dir = TempDir::new().unwrap();

    let controller = WatchController::new();
    let result = load_schema_files_in(
        &controller,
        options_for(&temp_dir),
        Arc::new(SdlBuilder),
        Arc::new(RecordingHost::default()),
        None,
    );

    assert!(matches!(
        result,
        Err(schemax::SchemaError::SchemaNotFound { .. })
    ));
}

/// 监听 + federation：重建走联邦构建路径
#[test]
fn test_watch_federation_build() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("a.graphql");
    fs::write(&file_path, "type A { id: ID }").unwrap();

    let mut options = options_for(&temp_dir);
    options.watch.enabled = true;
    options.federation = true;

    let host = Arc::new(RecordingHost::default());
    let controller = WatchController::new();
    let loaded = load_schema_files_in(
        &controller,
        options,
        Arc::new(SdlBuilder),
        host.clone(),
        None,
    )
    .unwrap();

    thread::sleep(Duration::from_millis(300));
    fs::write(&file_path, "type A { id: ID, name: String }").unwrap();
    thread::sleep(Duration::from_millis(800));

    assert!(host
        .replaced
        .lock()
        .unwrap()
        .iter()
        .any(|s| s.starts_with("federated:")));

    loaded.close_watcher();
}

/// 重复初始化：同一控制器上第二次加载会先关闭第一次的监听
#[test]
fn test_reinit_replaces_watcher() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.graphql"), "type A { id: ID }").unwrap();

    let mut options = options_for(&temp_dir);
    options.watch.enabled = true;

    let controller = WatchController::new();
    let first = load_schema_files_in(
        &controller,
        options.clone(),
        Arc::new(SdlBuilder),
        Arc::new(RecordingHost::default()),
        None,
    )
    .unwrap();
    assert!(!first.watcher_handle().is_closed());

    let second = load_schema_files_in(
        &controller,
        options,
        Arc::new(SdlBuilder),
        Arc::new(RecordingHost::default()),
        None,
    )
    .unwrap();

    assert!(first.watcher_handle().is_closed(), "旧监听应该在新监听安装前被关闭");
    assert!(!second.watcher_handle().is_closed());

    second.close_watcher();
}
