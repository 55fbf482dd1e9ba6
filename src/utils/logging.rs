use anyhow::Result;
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::fs;
use tracing::info;

/// 初始化日志文件
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n批量账单提交日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(dry_run: bool) {
    info!("{}", "=".repeat(60));
    if dry_run {
        info!("🚀 程序启动 - 批量账单提交（试运行模式）");
    } else {
        info!("🚀 程序启动 - 批量账单提交");
    }
    info!("{}", "=".repeat(60));
}

/// 记录批次加载信息
pub fn log_batches_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的批次", total);
    info!("💡 批次之间严格串行，组内也不并发\n");
}

/// 记录批次开始信息
pub fn log_batch_start(batch_num: usize, total_batches: usize, row_count: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 个批次 ({} 行)", batch_num, total_batches, row_count);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 个批次完成: 成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(
    success: usize,
    errors: usize,
    needs_review: usize,
    skipped: usize,
    log_file_path: &str,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}", success);
    info!("❌ 失败: {}", errors);
    info!("🔎 待人工处理: {}", needs_review);
    info!("⏭️ 跳过: {}", skipped);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
