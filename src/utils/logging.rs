//! 日志工具模块
//!
//! 提供启动、批次进度和最终统计的输出函数

use crate::config::{Config, DrainPolicy};
use crate::models::ResultSignal;
use crate::orchestrator::batch_dispatcher::SignalTally;
use std::time::Duration;
use tracing::{info, warn};

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 分批并发地址查询");
    info!("🌐 查询地址: {}", config.endpoint_url);
    info!("📄 名单文件: {}", config.source_path);
    info!("📊 批大小: {} (收尾策略: {})", config.batch_size, config.drain_policy);
    if let Some(dir) = &config.html_dump_dir {
        info!("💾 响应页面保存至: {}", dir);
    }
    info!("{}", "=".repeat(60));
}

/// 记录名单加载信息
///
/// # 参数
/// - `total`: 姓名总数
/// - `batch_size`: 每批并发数量
/// - `policy`: 批次收尾策略
pub fn log_names_loaded(total: usize, batch_size: usize, policy: DrainPolicy) {
    info!("Getting addresses of {} doctors.", total);
    info!(
        "The requests will be made in batches of {} concurrent requests",
        batch_size
    );
    if policy == DrainPolicy::Legacy {
        warn!("⚠️ 使用 legacy 收尾策略：最后一批的部分结果不会被收取");
    }
}

/// 记录批次开始收取
pub fn log_batch_waiting(batch_num: usize) {
    info!("\n{}", "─".repeat(60));
    info!("Batch {} waiting for responses", batch_num);
}

/// 记录一个收取到的结果
///
/// # 参数
/// - `position`: 在本批中的序号（从 1 开始）
/// - `signal`: 结果信号
pub fn log_response(position: usize, signal: &ResultSignal) {
    match signal {
        ResultSignal::Failed { name, reason } => {
            info!("response {} {}", position, signal);
            warn!("  ↳ [{}] {}", name, reason);
        }
        _ => info!("response {} {}", position, signal),
    }
}

/// 记录本批收取耗时
pub fn log_batch_elapsed(batch_num: usize, elapsed: Duration) {
    info!("⏱ 第 {} 批耗时 {:?}", batch_num, elapsed);
}

/// 打印最终统计信息
///
/// # 参数
/// - `tally`: 已收取结果的分类统计
/// - `dispatched`: 派发总数
/// - `abandoned`: 未收取的数量
pub fn print_final_stats(tally: &SignalTally, dispatched: usize, abandoned: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 找到地址: {}/{}", tally.found, dispatched);
    info!("🔍 未找到: {}", tally.not_found);
    info!("❌ 失败: {}", tally.failed);
    if abandoned > 0 {
        warn!("⚠️ 未收取: {}", abandoned);
    }
    info!("{}", "=".repeat(60));
    info!("Done");
}
