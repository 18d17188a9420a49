/// 日志工具模块
///
/// 提供运行横幅和统计输出的辅助函数
use crate::config::Config;
use crate::orchestrator::RunStats;
use std::path::Path;
use tracing::info;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - PVGIS 发电量批量查询 ({})",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📁 输入目录: {}", config.input_dir.display());
    info!("📁 输出目录: {}", config.output_dir.display());
    info!(
        "⏱️ 超时 {} 秒，请求间隔 {} 秒",
        config.request_timeout_secs, config.request_delay_secs
    );
    info!("{}", "=".repeat(60));
}

/// 记录单个文件开始处理
pub fn log_file_start(file_index: usize, total_files: usize, path: &Path) {
    info!("\n{}", "=".repeat(60));
    info!(
        "📄 处理第 {}/{} 个文件: {}",
        file_index,
        total_files,
        path.file_name().unwrap_or_default().to_string_lossy()
    );
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &RunStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部文件处理完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📄 找到文件: {}", stats.files_found);
    info!("✅ 成功写出: {}", stats.files_written);
    info!("⏭️ 跳过: {}", stats.files_skipped);
    info!("❌ 写入失败: {}", stats.files_write_failed);
    info!(
        "🔎 查询: 成功 {} / 缺失 {} (共 {} 条记录)",
        stats.fetched, stats.missing, stats.records
    );
    info!("🧹 清洗丢弃: {} 行", stats.dropped);
    info!("{}", "=".repeat(60));
}
