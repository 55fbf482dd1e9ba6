//! 账单组处理流程 - 流程层
//!
//! 核心职责：定义"一个账单组"的完整处理流程
//!
//! 流程顺序：
//! 1. 解析实体（供应商 → 客户 → 逐行项目/类别 → 部门 → 费用科目）
//! 2. 构建并提交账单
//! 3. 构建并提交配套发票（按设置）
//! 4. 挂接附件（逐文件独立，失败不升级）
//!
//! 这里的错误用 `?` 一路向上传播，由编排层在组边界统一捕获；
//! 只有附件是例外，逐文件自行消化。

use indexmap::IndexSet;
use tracing::info;

use crate::clients::api::AccountingApi;
use crate::error::AppResult;
use crate::models::{AttachmentResult, BillGroup, FileMap, Settings};
use crate::services::attachment_linker::{collect_filenames, AttachmentLinker};
use crate::services::document_builder::{self, LineEntities};
use crate::services::entity_resolver::EntityResolver;
use crate::workflow::group_ctx::GroupCtx;

/// 组级处理结果，由编排层复制到组内每一行
#[derive(Debug, Clone)]
pub struct GroupOutcome {
    pub customer_id: String,
    pub sub_customer_id: String,
    pub vendor_id: String,
    pub bill_id: String,
    pub invoice_id: Option<String>,
    pub attachments: Vec<AttachmentResult>,
}

/// 账单组处理流程
///
/// - 编排一个组从实体解析到附件挂接的完整过程
/// - 不持有解析缓存（缓存归编排器，跨组共享）
/// - 只依赖业务能力（services）和适配器接口
pub struct BillFlow<'a, A> {
    api: &'a A,
    settings: &'a Settings,
    files: &'a FileMap,
}

impl<'a, A: AccountingApi> BillFlow<'a, A> {
    /// 创建新的账单组流程
    pub fn new(api: &'a A, settings: &'a Settings, files: &'a FileMap) -> Self {
        Self {
            api,
            settings,
            files,
        }
    }

    pub async fn run(
        &self,
        resolver: &mut EntityResolver,
        group: &BillGroup,
        ctx: &GroupCtx,
    ) -> AppResult<GroupOutcome> {
        let first = group.first_row();

        // ========== 阶段 1: 解析实体 ==========
        info!("[组 {}] 🔍 解析实体...", ctx.group_index);

        let vendor = resolver
            .resolve_vendor(self.api, first.vendor_name.trim(), self.settings.auto_create)
            .await?;
        let customer = resolver
            .resolve_customer(self.api, first.customer_name.trim(), self.settings.auto_create)
            .await?;

        // 行级实体：项目在顶级客户之下逐行解析（缓存吸收重复）
        let mut line_entities = Vec::with_capacity(group.rows.len());
        for (_, row) in &group.rows {
            let sub_customer = resolver
                .resolve_sub_customer(self.api, &customer, row.project_name.trim())
                .await?;
            let class = resolver.resolve_class(self.api, row.class.trim()).await?;
            line_entities.push(LineEntities {
                sub_customer,
                class,
            });
        }

        let department = resolver
            .resolve_department(self.api, first.location.trim())
            .await?;
        let expense_account = resolver.expense_account(self.api).await?;

        // ========== 阶段 2: 构建并提交账单 ==========
        let bill = document_builder::build_bill(
            group,
            self.settings,
            vendor.clone(),
            department,
            expense_account,
            &line_entities,
        )?;

        info!(
            "[组 {}] 📤 正在创建账单 #{} ({} 行)...",
            ctx.group_index,
            ctx.bill_number,
            bill.lines.len()
        );
        let bill_id = self.api.create_bill(&bill).await?;
        info!("[组 {}] ✓ 账单创建成功: {}", ctx.group_index, bill_id);

        // ========== 阶段 3: 配套发票 ==========
        let mut invoice_id = None;
        if self.settings.from_billable_expenses {
            let invoice = document_builder::build_invoice(
                group,
                self.settings,
                line_entities[0].sub_customer.clone(),
            )?;
            info!("[组 {}] 📤 正在从可开票费用创建发票...", ctx.group_index);
            let id = self
                .api
                .create_invoice_from_billable_expenses(&invoice)
                .await?;
            info!("[组 {}] ✓ 发票创建成功: {}", ctx.group_index, id);
            invoice_id = Some(id);
        }

        // ========== 阶段 4: 附件 ==========
        let names = collect_filenames(group);
        let mut attachments = Vec::new();
        if !names.is_empty() {
            info!("[组 {}] 📎 处理 {} 个附件...", ctx.group_index, names.len());
            let linker = AttachmentLinker::new(self.api, self.files);
            attachments = linker.attach_to_bill(&names, &bill_id).await;

            if self.settings.also_attach_to_invoice {
                if let Some(invoice_id) = &invoice_id {
                    linker
                        .attach_to_invoice_best_effort(&names, invoice_id)
                        .await;
                }
            }
        }

        Ok(GroupOutcome {
            customer_id: customer.id,
            sub_customer_id: line_entities[0].sub_customer.id.clone(),
            vendor_id: vendor.id,
            bill_id,
            invoice_id,
            attachments,
        })
    }
}

/// 试运行叙述
///
/// 与 `BillFlow::run` 的动作顺序保持一致，但不触达外部系统。
/// 返回 (意图动作列表, 告警列表)，由编排层复制到组内每一行。
pub fn narrate(group: &BillGroup, settings: &Settings, files: &FileMap) -> (Vec<String>, Vec<String>) {
    let first = group.first_row();
    let mut actions = Vec::new();
    let mut warnings = Vec::new();

    let verb = if settings.auto_create {
        "Find or create"
    } else {
        "Find"
    };
    actions.push(format!("{} Vendor: {}", verb, first.vendor_name.trim()));
    actions.push(format!("{} Customer: {}", verb, first.customer_name.trim()));

    // 每个不同的项目一条
    let mut seen_projects = IndexSet::new();
    for (_, row) in &group.rows {
        let project = row.project_name.trim();
        if !project.is_empty() && seen_projects.insert(project.to_string()) {
            actions.push(format!("Find or create Project: {}", project));
        }
    }

    let location = first.location.trim();
    if !location.is_empty() {
        actions.push(format!("Find Department: {}", location));
    }

    // 每行一条费用行叙述
    for (_, row) in &group.rows {
        let currency = settings.effective_currency(&row.currency);
        actions.push(format!(
            "Add line: {} ({} {})",
            row.bill_line_description.trim(),
            row.bill_line_amount.trim(),
            currency
        ));
    }

    actions.push(format!(
        "Create Bill #{} with {} line item(s)",
        group.bill_number,
        group.rows.len()
    ));

    if settings.from_billable_expenses {
        actions.push(format!(
            "Create Invoice from billable expenses for Project: {}",
            first.project_name.trim()
        ));
    }

    let names = collect_filenames(group);
    if !names.is_empty() {
        actions.push(format!("Upload {} attachment(s)", names.len()));
        for name in &names {
            if !files.contains_key(name) {
                warnings.push(format!("Attachment \"{}\" not found in uploads", name));
            }
        }
    }

    (actions, warnings)
}
