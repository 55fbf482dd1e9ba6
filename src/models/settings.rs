//! 批次设置
//!
//! 一个批次在整个处理过程中不可变的开关集合。

use serde::{Deserialize, Serialize};

/// 目标环境
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// 沙箱环境
    #[default]
    Sandbox,
    /// 生产环境
    Production,
}

/// 批次级设置
///
/// 由上游（批次文件 / 调用方）给出，处理期间只读。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// 客户 / 供应商未找到时是否自动创建
    pub auto_create: bool,
    /// 附件是否同时挂到发票上（尽力而为）
    pub also_attach_to_invoice: bool,
    /// 是否从可开票费用生成配套发票
    pub from_billable_expenses: bool,
    /// 行内未给出币种时使用的默认币种
    pub default_currency: String,
    /// 日期是否只接受严格格式
    pub strict_date_parsing: bool,
    /// 目标环境
    pub environment: Environment,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_create: false,
            also_attach_to_invoice: false,
            from_billable_expenses: true,
            default_currency: "USD".to_string(),
            strict_date_parsing: false,
            environment: Environment::Sandbox,
        }
    }
}

impl Settings {
    /// 解析某一行的有效币种：行内值优先，否则批次默认值
    pub fn effective_currency(&self, row_currency: &str) -> String {
        let trimmed = row_currency.trim();
        if trimmed.is_empty() {
            self.default_currency.trim().to_string()
        } else {
            trimmed.to_string()
        }
    }
}
