//! # Bill Batch Submit
//!
//! 一个把已映射的表格账务记录批量重放到外部复式记账系统的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 适配器层（Clients）
//! - `clients/` - 外部记账系统的唯一出口
//! - `AccountingApi` - 查找/创建实体、提交单据、上传附件
//! - `Retrying<A>` - 限流退避装饰器，统一套在每个适配器方法上
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单行或单组
//! - `row_validator` - 行校验能力（收集错误，从不抛出）
//! - `bill_grouper` - 按账单编号分组能力
//! - `entity_resolver` - 查找或创建实体能力（带批内缓存）
//! - `document_builder` - 账单 / 发票组装能力
//! - `attachment_linker` - 附件上传挂接能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个账单组"的完整处理流程
//! - `GroupCtx` - 上下文封装（组索引 + 账单编号）
//! - `BillFlow` - 流程编排（resolve → build → submit → attach）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/processing_orchestrator` - 单个批次编排器，dry_run 与 execute 共用准备路径
//! - `orchestrator/batch_processor` - 批次集合处理器，管理资源和统计
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{AccountingApi, ApiFault, HttpAccountingClient, RetryPolicy, Retrying};
pub use config::Config;
pub use error::{AppError, AppResult, EntityKind, ValidationError};
pub use models::{
    BillDocument, BillGroup, DryRunResult, FileMap, ImportRow, InvoiceDocument, ProcessingResult,
    RowStatus, Settings,
};
pub use orchestrator::{App, IdempotencyStore, InMemoryIdempotencyStore, ProcessingOrchestrator};
pub use workflow::{BillFlow, GroupCtx, GroupOutcome};
