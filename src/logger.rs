//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅器
///
/// 优先使用 `RUST_LOG`；未设置时默认 `info`，`verbose` 为真时为 `debug`。
/// 重复调用是安全的（测试中多次初始化会被忽略）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
