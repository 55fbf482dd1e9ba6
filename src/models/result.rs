//! 处理结果模型
//!
//! 每个原始行索引对应一个 ProcessingResult；
//! 状态是封闭枚举，不是自由文本。

use serde::{Deserialize, Serialize};

/// 行级终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    /// 处理成功
    Success,
    /// 处理失败（校验错误或外部调用失败）
    Error,
    /// 需要人工处理（缺失实体且未开启自动创建）
    NeedsReview,
    /// 跳过（空行，或所在组已处理过）
    Skipped,
}

/// 单个附件的上传结果
///
/// 与所属行 / 组的整体状态相互独立。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentResult {
    pub filename: String,
    pub status: AttachmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachable_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 附件状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentStatus {
    Success,
    Error,
}

/// 行级处理结果
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub row_index: usize,
    pub status: RowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachment_results: Vec<AttachmentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl ProcessingResult {
    fn bare(row_index: usize, status: RowStatus) -> Self {
        Self {
            row_index,
            status,
            customer_id: None,
            sub_customer_id: None,
            vendor_id: None,
            bill_id: None,
            invoice_id: None,
            attachment_results: Vec::new(),
            error: None,
            message: None,
            idempotency_key: None,
        }
    }

    /// 跳过
    pub fn skipped(row_index: usize, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::bare(row_index, RowStatus::Skipped)
        }
    }

    /// 失败
    pub fn error(row_index: usize, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::bare(row_index, RowStatus::Error)
        }
    }

    /// 需人工处理
    pub fn needs_review(row_index: usize, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::bare(row_index, RowStatus::NeedsReview)
        }
    }

    /// 成功（由组级结果复制到每一行）
    #[allow(clippy::too_many_arguments)]
    pub fn success(
        row_index: usize,
        customer_id: String,
        sub_customer_id: String,
        vendor_id: String,
        bill_id: String,
        invoice_id: Option<String>,
        attachment_results: Vec<AttachmentResult>,
        idempotency_key: String,
    ) -> Self {
        Self {
            customer_id: Some(customer_id),
            sub_customer_id: Some(sub_customer_id),
            vendor_id: Some(vendor_id),
            bill_id: Some(bill_id),
            invoice_id,
            attachment_results,
            idempotency_key: Some(idempotency_key),
            ..Self::bare(row_index, RowStatus::Success)
        }
    }
}

/// 试运行结果
///
/// 与 ProcessingResult 一样按原始行索引对齐，但只携带叙述性内容。
#[derive(Debug, Clone, Serialize)]
pub struct DryRunResult {
    pub row_index: usize,
    pub actions: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl DryRunResult {
    pub fn new(row_index: usize) -> Self {
        Self {
            row_index,
            actions: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }
}
