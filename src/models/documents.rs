//! 外部单据模型
//!
//! 账单 / 发票是封闭的、显式可选字段的结构体，
//! 在构造时校验形状，而不是等到外部调用现场才发现缺字段。

use crate::error::{AppError, AppResult};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 发票上承载"联系人"的自定义字段名
pub const POINT_OF_CONTACT_FIELD: &str = "Point of Contact";

/// 外部实体引用：不透明 ID + 显示名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// 账单费用行
///
/// 每行对应导入批次中的一行：金额、描述、费用科目、
/// 子客户（项目）、可开票标记，以及可选的类别引用。
#[derive(Debug, Clone, Serialize)]
pub struct BillLine {
    pub amount: BigDecimal,
    pub description: String,
    pub expense_account: EntityRef,
    pub sub_customer: EntityRef,
    pub billable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<EntityRef>,
}

/// 多行账单单据
#[derive(Debug, Clone, Serialize)]
pub struct BillDocument {
    pub vendor: EntityRef,
    /// 单据编号（即账单编号）
    pub bill_number: String,
    pub bill_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub lines: Vec<BillLine>,
}

impl BillDocument {
    /// 构造并校验账单
    ///
    /// 无行或无编号的账单在这里就被拒绝，不会流向外部 API。
    pub fn new(
        vendor: EntityRef,
        bill_number: String,
        bill_date: NaiveDate,
        department: Option<EntityRef>,
        currency: Option<String>,
        lines: Vec<BillLine>,
    ) -> AppResult<Self> {
        if bill_number.trim().is_empty() {
            return Err(AppError::Other("账单编号不能为空".to_string()));
        }
        if lines.is_empty() {
            return Err(AppError::Other(format!(
                "账单 {} 不包含任何费用行",
                bill_number
            )));
        }
        Ok(Self {
            vendor,
            bill_number,
            bill_date,
            department,
            currency,
            lines,
        })
    }
}

/// 发票自定义字段
#[derive(Debug, Clone, Serialize)]
pub struct CustomField {
    pub name: String,
    pub value: String,
}

/// 从可开票费用生成的配套发票
///
/// 客户引用指向组内第一行的子客户（项目）。
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDocument {
    pub customer: EntityRef,
    pub invoice_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<CustomField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn line() -> BillLine {
        BillLine {
            amount: BigDecimal::from_str("100").unwrap(),
            description: "desc".to_string(),
            expense_account: EntityRef::new("acc-1", "Expense"),
            sub_customer: EntityRef::new("sub-1", "Proj"),
            billable: true,
            class: None,
        }
    }

    #[test]
    fn bill_without_lines_is_rejected() {
        let result = BillDocument::new(
            EntityRef::new("v-1", "Bob"),
            "B1".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            None,
            None,
            Vec::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn bill_without_number_is_rejected() {
        let result = BillDocument::new(
            EntityRef::new("v-1", "Bob"),
            "  ".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            None,
            None,
            vec![line()],
        );
        assert!(result.is_err());
    }

    #[test]
    fn valid_bill_keeps_its_shape() {
        let bill = BillDocument::new(
            EntityRef::new("v-1", "Bob"),
            "B1".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            None,
            Some("USD".to_string()),
            vec![line()],
        )
        .unwrap();
        assert_eq!(bill.bill_number, "B1");
        assert_eq!(bill.lines.len(), 1);
        assert!(bill.lines[0].billable);
    }
}
