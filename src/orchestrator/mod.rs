//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量批次处理器
//! - 管理应用生命周期（初始化、运行、统计）
//! - 批量加载批次文件（Vec<BatchFile>）与附件目录
//! - 装配 HTTP 客户端和重试装饰器
//! - 输出全局统计信息
//!
//! ### `processing_orchestrator` - 处理编排器
//! - 驱动一个批次：空行分流 → 分组 → 校验 → 逐组执行
//! - dry_run 与 execute 共用同一条准备路径
//! - 幂等键检查，组边界统一捕获错误
//! - 按原始行索引回填结果
//!
//! ### `idempotency` - 幂等存储
//! - 可注入的已处理键集合，默认进程内实现
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<BatchFile>)
//!     ↓
//! processing_orchestrator (处理 Vec<ImportRow>)
//!     ↓
//! workflow::BillFlow (处理单个 BillGroup)
//!     ↓
//! services (能力层：validate / group / resolve / build / attach)
//!     ↓
//! clients (适配器：AccountingApi / 重试 / HTTP)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批次集合，processing_orchestrator 管单个批次
//! 2. **严格串行**：外部查找或创建没有原子性，禁止并发扇出
//! 3. **失败隔离**：组内失败只影响本组的行，批次永不中断

pub mod batch_processor;
pub mod idempotency;
pub mod processing_orchestrator;

// 重新导出主要类型
pub use batch_processor::App;
pub use idempotency::{IdempotencyStore, InMemoryIdempotencyStore};
pub use processing_orchestrator::{ProcessingOrchestrator, ProgressFn};
