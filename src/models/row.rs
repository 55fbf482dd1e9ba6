//! 导入行模型
//!
//! 上游（列映射 UI / 批次文件）产出的扁平行记录。
//! 所有字段都是未经校验的原始字符串，在通过 RowValidator 之前不可信。

use serde::{Deserialize, Serialize};

/// 一行已映射的账单数据
///
/// 字段名与上游列映射保持一致（PascalCase）。
/// 缺失的列反序列化为空字符串。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ImportRow {
    /// 账单编号（分组键）
    pub bill_number: String,
    /// 地点（映射到部门实体）
    pub location: String,
    /// 项目名称（子客户）
    pub project_name: String,
    /// 客户名称（顶级客户）
    pub customer_name: String,
    /// 供应商名称
    pub vendor_name: String,
    /// 账单日期
    pub bill_date: String,
    /// 费用行描述
    pub bill_line_description: String,
    /// 费用行金额
    pub bill_line_amount: String,
    /// 币种（3 位字母代码，缺省时使用批次默认币种）
    pub currency: String,
    /// 发票日期
    pub invoice_date: String,
    /// 类别（可选，找不到时静默省略）
    pub class: String,
    /// 采购订单号
    #[serde(rename = "PONumber")]
    pub po_number: String,
    /// 联系人
    pub point_of_contact: String,
    /// 附件文件名（分号分隔）
    pub attachments: String,
}

impl ImportRow {
    /// 被跟踪的全部字段
    ///
    /// 空行判定和"整行皆空"的跳过规则都以这份列表为准。
    fn tracked_fields(&self) -> [&str; 14] {
        [
            &self.bill_number,
            &self.location,
            &self.project_name,
            &self.customer_name,
            &self.vendor_name,
            &self.bill_date,
            &self.bill_line_description,
            &self.bill_line_amount,
            &self.currency,
            &self.invoice_date,
            &self.class,
            &self.po_number,
            &self.point_of_contact,
            &self.attachments,
        ]
    }

    /// 是否为空行（所有字段均为空白）
    ///
    /// 空行在编排层标记为 skipped，不参与分组，也不触发任何外部调用。
    pub fn is_empty(&self) -> bool {
        self.tracked_fields()
            .iter()
            .all(|f| f.trim().is_empty())
    }

    /// 拆分附件字段（分号分隔，去掉空白项）
    pub fn attachment_names(&self) -> Vec<String> {
        self.attachments
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_make_an_empty_row() {
        let row = ImportRow {
            bill_number: "   ".to_string(),
            currency: "".to_string(),
            ..Default::default()
        };
        assert!(row.is_empty());
    }

    #[test]
    fn any_value_makes_the_row_non_empty() {
        let row = ImportRow {
            bill_number: "B1".to_string(),
            ..Default::default()
        };
        assert!(!row.is_empty());
    }

    #[test]
    fn attachment_names_split_and_trim() {
        let row = ImportRow {
            attachments: "a.pdf; b.png ;; c.jpg".to_string(),
            ..Default::default()
        };
        assert_eq!(row.attachment_names(), vec!["a.pdf", "b.png", "c.jpg"]);
    }
}
