//! 单据构建服务 - 业务能力层
//!
//! 从已解析的实体和行数据组装账单 / 发票。
//! 账单级字段取组内第一行，行级字段逐行取值；
//! 币种解析顺序（行内值优先，否则默认值）对两种单据一致。

use crate::error::{AppError, AppResult};
use crate::models::{
    BillDocument, BillGroup, BillLine, CustomField, EntityRef, InvoiceDocument, Settings,
    POINT_OF_CONTACT_FIELD,
};
use crate::services::row_validator::{parse_amount, parse_date};
use bigdecimal::{BigDecimal, Zero};

/// 单行对应的已解析实体
#[derive(Debug, Clone)]
pub struct LineEntities {
    pub sub_customer: EntityRef,
    pub class: Option<EntityRef>,
}

/// 构建多行账单
///
/// `line_entities` 与组内行一一对应。
/// 行在到达这里之前已通过校验；这里仍然在构造时复核，
/// 坏数据在单据内部就被拒绝，不会流向外部调用。
pub fn build_bill(
    group: &BillGroup,
    settings: &Settings,
    vendor: EntityRef,
    department: Option<EntityRef>,
    expense_account: EntityRef,
    line_entities: &[LineEntities],
) -> AppResult<BillDocument> {
    let first = group.first_row();

    let bill_date = parse_date(&first.bill_date, settings.strict_date_parsing)
        .ok_or_else(|| AppError::Other(format!("无法解析账单日期: \"{}\"", first.bill_date)))?;

    let mut lines = Vec::with_capacity(group.rows.len());
    for ((row_index, row), entities) in group.rows.iter().zip(line_entities) {
        let amount = parse_amount(&row.bill_line_amount).ok_or_else(|| {
            AppError::Other(format!("第 {} 行金额无法解析: \"{}\"", row_index + 1, row.bill_line_amount))
        })?;
        if amount < BigDecimal::zero() {
            return Err(AppError::Other(format!("第 {} 行金额为负数", row_index + 1)));
        }

        lines.push(BillLine {
            amount,
            description: row.bill_line_description.trim().to_string(),
            expense_account: expense_account.clone(),
            sub_customer: entities.sub_customer.clone(),
            billable: true,
            class: entities.class.clone(),
        });
    }

    BillDocument::new(
        vendor,
        group.bill_number.clone(),
        bill_date,
        department,
        Some(settings.effective_currency(&first.currency)),
        lines,
    )
}

/// 构建配套发票
///
/// 客户引用取组内第一行的子客户；发票日期、PO 号、
/// 联系人也都来自第一行。
pub fn build_invoice(
    group: &BillGroup,
    settings: &Settings,
    sub_customer: EntityRef,
) -> AppResult<InvoiceDocument> {
    let first = group.first_row();

    let invoice_date = parse_date(&first.invoice_date, settings.strict_date_parsing)
        .ok_or_else(|| AppError::Other(format!("无法解析发票日期: \"{}\"", first.invoice_date)))?;

    let po_number = {
        let trimmed = first.po_number.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    let mut custom_fields = Vec::new();
    let poc = first.point_of_contact.trim();
    if !poc.is_empty() {
        custom_fields.push(CustomField {
            name: POINT_OF_CONTACT_FIELD.to_string(),
            value: poc.to_string(),
        });
    }

    Ok(InvoiceDocument {
        customer: sub_customer,
        invoice_date,
        po_number,
        custom_fields,
        currency: Some(settings.effective_currency(&first.currency)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImportRow;
    use std::str::FromStr;

    fn sample_group() -> BillGroup {
        let base = ImportRow {
            bill_number: "B1".to_string(),
            project_name: "Proj".to_string(),
            customer_name: "Acme".to_string(),
            vendor_name: "Bob".to_string(),
            bill_date: "2024-01-01".to_string(),
            invoice_date: "2024-01-02".to_string(),
            bill_line_description: "first".to_string(),
            bill_line_amount: "100".to_string(),
            po_number: "PO-9".to_string(),
            point_of_contact: "Jane".to_string(),
            ..Default::default()
        };
        let mut second = base.clone();
        second.bill_line_description = "second".to_string();
        second.bill_line_amount = "$2,000".to_string();
        second.currency = "EUR".to_string();

        BillGroup {
            bill_number: "B1".to_string(),
            rows: vec![(0, base), (1, second)],
        }
    }

    fn entities() -> Vec<LineEntities> {
        let sub = EntityRef::new("sub-1", "Proj");
        vec![
            LineEntities {
                sub_customer: sub.clone(),
                class: None,
            },
            LineEntities {
                sub_customer: sub,
                class: Some(EntityRef::new("cls-1", "Ops")),
            },
        ]
    }

    #[test]
    fn bill_carries_one_line_per_row() {
        let bill = build_bill(
            &sample_group(),
            &Settings::default(),
            EntityRef::new("v-1", "Bob"),
            None,
            EntityRef::new("acc-1", "Expense"),
            &entities(),
        )
        .unwrap();

        assert_eq!(bill.bill_number, "B1");
        assert_eq!(bill.lines.len(), 2);
        assert!(bill.lines.iter().all(|l| l.billable));
        assert_eq!(bill.lines[1].amount, BigDecimal::from_str("2000").unwrap());
        assert_eq!(bill.lines[1].class.as_ref().unwrap().id, "cls-1");
        // 账单级币种取第一行（第一行为空 → 默认值）
        assert_eq!(bill.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn invoice_uses_first_row_fields() {
        let invoice = build_invoice(
            &sample_group(),
            &Settings::default(),
            EntityRef::new("sub-1", "Proj"),
        )
        .unwrap();

        assert_eq!(invoice.customer.id, "sub-1");
        assert_eq!(invoice.po_number.as_deref(), Some("PO-9"));
        assert_eq!(invoice.custom_fields.len(), 1);
        assert_eq!(invoice.custom_fields[0].name, POINT_OF_CONTACT_FIELD);
        assert_eq!(invoice.custom_fields[0].value, "Jane");
        assert_eq!(invoice.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn unparsable_amount_fails_construction() {
        let mut group = sample_group();
        group.rows[0].1.bill_line_amount = "abc".to_string();
        let result = build_bill(
            &group,
            &Settings::default(),
            EntityRef::new("v-1", "Bob"),
            None,
            EntityRef::new("acc-1", "Expense"),
            &entities(),
        );
        assert!(result.is_err());
    }
}
