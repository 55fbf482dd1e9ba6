//! 批量批次处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批次文件的加载和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志文件、装配 API 客户端
//! 2. **批量加载**：扫描并加载所有待处理的批次（`Vec<BatchFile>`）
//! 3. **附件装载**：把附件目录读入内存映射
//! 4. **顺序处理**：批次间严格串行，向下委托 ProcessingOrchestrator
//! 5. **结果落盘**：每个批次的结果写成 JSON
//! 6. **全局统计**：汇总所有批次的处理结果

use crate::clients::{HttpAccountingClient, Retrying};
use crate::config::Config;
use crate::models::loaders::{load_all_batch_files, load_attachment_folder};
use crate::models::{BatchFile, FileMap, RowStatus};
use crate::orchestrator::processing_orchestrator::ProcessingOrchestrator;
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_batches_loaded, log_startup,
    print_final_stats,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    errors: usize,
    needs_review: usize,
    skipped: usize,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        init_log_file(&config.output_log_file)?;
        log_startup(config.dry_run);
        Ok(Self { config })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 加载所有待处理的批次
        let batches = load_all_batch_files(&self.config.batch_folder).await?;

        if batches.is_empty() {
            warn!("⚠️ 没有找到待处理的批次文件，程序结束");
            return Ok(());
        }

        // 附件目录整体读入内存
        let files = load_attachment_folder(&self.config.attachments_folder).await?;
        if !files.is_empty() {
            info!("📎 装载了 {} 个附件文件", files.len());
        }

        let total_batches = batches.len();
        log_batches_loaded(total_batches);

        let mut stats = ProcessingStats::default();

        for (index, batch) in batches.iter().enumerate() {
            log_batch_start(index + 1, total_batches, batch.rows.len());

            if self.config.dry_run {
                self.dry_run_batch(batch, &files).await?;
                continue;
            }

            let batch_stats = self.process_batch(batch, &files).await?;
            log_batch_complete(index + 1, batch_stats.success, batch.rows.len());

            stats.success += batch_stats.success;
            stats.errors += batch_stats.errors;
            stats.needs_review += batch_stats.needs_review;
            stats.skipped += batch_stats.skipped;
        }

        if !self.config.dry_run {
            print_final_stats(
                stats.success,
                stats.errors,
                stats.needs_review,
                stats.skipped,
                &self.config.output_log_file,
            );
        }

        Ok(())
    }

    /// 真实执行一个批次
    async fn process_batch(&self, batch: &BatchFile, files: &FileMap) -> Result<ProcessingStats> {
        let client = HttpAccountingClient::from_config(&self.config, batch.settings.environment);
        let api = Retrying::with_default(client);
        let mut orchestrator = ProcessingOrchestrator::new(api, batch.settings.clone());

        let progress = |done: usize, total: usize| info!("📈 进度: {}/{}", done, total);
        let results = orchestrator
            .execute(&batch.rows, files, Some(&progress))
            .await;

        let mut stats = ProcessingStats::default();
        for result in &results {
            match result.status {
                RowStatus::Success => stats.success += 1,
                RowStatus::Error => stats.errors += 1,
                RowStatus::NeedsReview => stats.needs_review += 1,
                RowStatus::Skipped => stats.skipped += 1,
            }
        }

        // 详细日志（如果启用）
        if self.config.verbose_logging {
            for result in &results {
                info!("  行 {}: {:?}", result.row_index + 1, result.status);
            }
        }

        self.write_results(batch, &serde_json::to_string_pretty(&results)?)
            .await?;

        Ok(stats)
    }

    /// 试运行一个批次
    async fn dry_run_batch(&self, batch: &BatchFile, files: &FileMap) -> Result<()> {
        let client = HttpAccountingClient::from_config(&self.config, batch.settings.environment);
        let api = Retrying::with_default(client);
        let orchestrator = ProcessingOrchestrator::new(api, batch.settings.clone());

        let results = orchestrator.dry_run(&batch.rows, files);
        let errored = results.iter().filter(|r| !r.errors.is_empty()).count();
        info!(
            "📝 试运行完成: {} 行，其中 {} 行有校验错误",
            results.len(),
            errored
        );

        self.write_results(batch, &serde_json::to_string_pretty(&results)?)
            .await
    }

    /// 把结果 JSON 写到批次文件旁边
    async fn write_results(&self, batch: &BatchFile, payload: &str) -> Result<()> {
        if let Some(path) = &batch.file_path {
            let out = format!("{}.results.json", path);
            tokio::fs::write(&out, payload)
                .await
                .with_context(|| format!("无法写入结果文件: {}", out))?;
            info!("📄 结果已写入: {}", out);
        }
        Ok(())
    }
}
