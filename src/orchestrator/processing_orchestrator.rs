//! 处理编排器 - 编排层
//!
//! ## 职责
//!
//! 驱动一个批次的两种跑法：
//!
//! 1. **dry_run**：只校验和叙述意图，不触达外部系统
//! 2. **execute**：真实执行，逐组顺序处理
//!
//! 两条路径共用同一个 `prepare`（空行分流 + 分组 + 校验），
//! 这是硬性契约——绝不允许出现两套独立的分组/校验实现。
//!
//! ## 失败边界
//!
//! 组内的意外错误在这里被捕获一次，转成整组的 error 状态；
//! 批次从不因单个组失败而中断。
//!
//! ## 顺序性
//!
//! 严格串行：上一组完整结束（解析 → 构建 → 提交 → 附件）
//! 才开始下一组。外部的"查找或创建"没有原子性保证，
//! 并发解析同名实体会产生重复建档。

use crate::clients::api::AccountingApi;
use crate::error::{AppError, ValidationError};
use crate::models::{BillGroup, DryRunResult, FileMap, ImportRow, ProcessingResult, Settings};
use crate::orchestrator::idempotency::{IdempotencyStore, InMemoryIdempotencyStore};
use crate::services::entity_resolver::EntityResolver;
use crate::services::{bill_grouper, row_validator};
use crate::utils::logging::truncate_text;
use crate::workflow::{narrate, BillFlow, GroupCtx};
use tracing::{error, info};

/// 进度回调：每处理完一个组调用一次（已处理行数, 总行数）
pub type ProgressFn = dyn Fn(usize, usize) + Send + Sync;

/// 共同准备阶段的产物
struct Prepared {
    groups: Vec<BillGroup>,
    /// 与 groups 一一对应的聚合校验错误
    group_errors: Vec<Vec<ValidationError>>,
    empty_rows: Vec<usize>,
}

/// 处理编排器
///
/// 幂等键集合与实体解析缓存都挂在实例上：
/// 同一个实例跑两遍相同批次，第二遍会整组 skipped。
pub struct ProcessingOrchestrator<A: AccountingApi, S: IdempotencyStore = InMemoryIdempotencyStore>
{
    api: A,
    settings: Settings,
    store: S,
    resolver: EntityResolver,
}

impl<A: AccountingApi> ProcessingOrchestrator<A, InMemoryIdempotencyStore> {
    /// 使用进程内幂等存储创建编排器
    pub fn new(api: A, settings: Settings) -> Self {
        Self::with_store(api, settings, InMemoryIdempotencyStore::default())
    }
}

impl<A: AccountingApi, S: IdempotencyStore> ProcessingOrchestrator<A, S> {
    /// 注入自定义幂等存储
    pub fn with_store(api: A, settings: Settings, store: S) -> Self {
        Self {
            api,
            settings,
            store,
            resolver: EntityResolver::new(),
        }
    }

    /// 访问底层适配器
    pub fn api(&self) -> &A {
        &self.api
    }

    /// 拆出底层适配器（测试断言用）
    pub fn into_api(self) -> A {
        self.api
    }

    /// 共同准备阶段：空行分流 + 分组 + 逐组聚合校验
    fn prepare(&self, rows: &[ImportRow]) -> Prepared {
        let empty_rows: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_empty())
            .map(|(index, _)| index)
            .collect();

        let groups = bill_grouper::group(rows);

        let group_errors = groups
            .iter()
            .map(|group| {
                group
                    .rows
                    .iter()
                    .flat_map(|(index, row)| row_validator::validate(row, *index, &self.settings))
                    .collect()
            })
            .collect();

        Prepared {
            groups,
            group_errors,
            empty_rows,
        }
    }

    /// 真实执行一个批次
    ///
    /// 返回与输入行一一对应、按原始索引排列的结果。
    pub async fn execute(
        &mut self,
        rows: &[ImportRow],
        files: &FileMap,
        progress: Option<&ProgressFn>,
    ) -> Vec<ProcessingResult> {
        let prepared = self.prepare(rows);
        let total = rows.len();
        let mut slots: Vec<Option<ProcessingResult>> = vec![None; total];

        for index in &prepared.empty_rows {
            slots[*index] = Some(ProcessingResult::skipped(*index, "Empty row"));
        }
        let mut processed_rows = prepared.empty_rows.len();

        for (group_pos, (group, errors)) in prepared
            .groups
            .iter()
            .zip(&prepared.group_errors)
            .enumerate()
        {
            let ctx = GroupCtx::new(group.bill_number.clone(), group_pos + 1, group.rows.len());
            info!("\n{} 开始处理", ctx);

            let outcome = self.process_group(group, errors, &ctx, files).await;
            for index in group.row_indices() {
                slots[index] = Some(clone_for_row(&outcome, index));
            }

            processed_rows += group.rows.len();
            if let Some(callback) = progress {
                callback(processed_rows, total);
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| ProcessingResult::skipped(index, "Empty row"))
            })
            .collect()
    }

    /// 处理单个组，返回要复制到每一行的"模板"结果
    ///
    /// 唯一的组级 catch 点：流程内任何意外错误到这里为止。
    async fn process_group(
        &mut self,
        group: &BillGroup,
        errors: &[ValidationError],
        ctx: &GroupCtx,
        files: &FileMap,
    ) -> RowTemplate {
        // 校验失败 → 整组 error，不发起任何外部调用
        if !errors.is_empty() {
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            info!("{} ⚠️ 校验未通过: {}", ctx, truncate_text(&message, 120));
            return RowTemplate::Error(message);
        }

        // 幂等检查：已处理过的账单整组跳过，零外部调用
        let key = group.idempotency_key();
        if let Some(key) = &key {
            if self.store.contains(key) {
                info!("{} ⏭️ 账单已处理过，跳过", ctx);
                return RowTemplate::Skipped(format!(
                    "Bill \"{}\" already processed",
                    group.bill_number
                ));
            }
        }

        let flow = BillFlow::new(&self.api, &self.settings, files);
        match flow.run(&mut self.resolver, group, ctx).await {
            Ok(outcome) => {
                if let Some(key) = key {
                    self.store.insert(key.clone());
                    info!("{} ✅ 组处理完成 (幂等键: {})", ctx, key);
                    RowTemplate::Success { outcome, key }
                } else {
                    // 隐式组没有账单编号，不可能走到这里：
                    // 缺编号的行在校验阶段就已经被拦下
                    RowTemplate::Error("Bill number is required".to_string())
                }
            }
            Err(AppError::EntityNotFound { kind, name }) => {
                info!("{} 🔎 {} \"{}\" 缺失，转人工处理", ctx, kind, name);
                RowTemplate::NeedsReview(
                    AppError::EntityNotFound { kind, name }.to_string(),
                )
            }
            Err(err) => {
                error!("{} ❌ 组处理失败: {}", ctx, err);
                RowTemplate::Error(err.to_string())
            }
        }
    }

    /// 试运行一个批次
    ///
    /// 与 execute 共用 prepare；对有效组叙述意图动作，
    /// 对无效组把聚合的字段错误复制到每一行。
    pub fn dry_run(&self, rows: &[ImportRow], files: &FileMap) -> Vec<DryRunResult> {
        let prepared = self.prepare(rows);
        let mut results: Vec<DryRunResult> = (0..rows.len()).map(DryRunResult::new).collect();

        for index in &prepared.empty_rows {
            results[*index]
                .warnings
                .push("Empty row, will be skipped".to_string());
        }

        for (group, errors) in prepared.groups.iter().zip(&prepared.group_errors) {
            if !errors.is_empty() {
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                for index in group.row_indices() {
                    results[index].errors = messages.clone();
                }
            } else {
                let (actions, warnings) = narrate(group, &self.settings, files);
                for index in group.row_indices() {
                    results[index].actions = actions.clone();
                    results[index].warnings.extend(warnings.iter().cloned());
                }
            }
        }

        results
    }
}

/// 复制到组内每一行的结果模板
enum RowTemplate {
    Success {
        outcome: crate::workflow::GroupOutcome,
        key: String,
    },
    Error(String),
    NeedsReview(String),
    Skipped(String),
}

fn clone_for_row(template: &RowTemplate, index: usize) -> ProcessingResult {
    match template {
        RowTemplate::Success { outcome, key } => ProcessingResult::success(
            index,
            outcome.customer_id.clone(),
            outcome.sub_customer_id.clone(),
            outcome.vendor_id.clone(),
            outcome.bill_id.clone(),
            outcome.invoice_id.clone(),
            outcome.attachments.clone(),
            key.clone(),
        ),
        RowTemplate::Error(message) => ProcessingResult::error(index, message.clone()),
        RowTemplate::NeedsReview(message) => ProcessingResult::needs_review(index, message.clone()),
        RowTemplate::Skipped(message) => ProcessingResult::skipped(index, message.clone()),
    }
}
