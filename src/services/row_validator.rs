//! 行校验服务 - 业务能力层
//!
//! 只负责"校验"能力：行 + 设置 → 字段错误列表。
//! 永不抛出；空行返回空列表，由上游标记为 skipped。

use crate::error::ValidationError;
use crate::models::{ImportRow, Settings};
use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

/// 严格模式唯一接受的日期格式
const STRICT_DATE_FORMAT: &str = "%Y-%m-%d";

/// 宽松模式依次尝试的格式
const LENIENT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
];

fn currency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{3}$").expect("内置正则"))
}

fn amount_junk_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // 货币符号、千分位和空白都不参与数值解析
    RE.get_or_init(|| Regex::new(r"[$€£¥,\s]").expect("内置正则"))
}

/// 按设置解析日期字符串
pub fn parse_date(value: &str, strict: bool) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if strict {
        NaiveDate::parse_from_str(trimmed, STRICT_DATE_FORMAT).ok()
    } else {
        LENIENT_DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
    }
}

/// 清洗并解析金额字符串
pub fn parse_amount(value: &str) -> Option<BigDecimal> {
    let cleaned = amount_junk_re().replace_all(value.trim(), "");
    if cleaned.is_empty() {
        return None;
    }
    BigDecimal::from_str(&cleaned).ok()
}

/// 校验一行
///
/// 空行直接返回空列表；非空行无条件跑完全部检查，
/// 错误被收集而不是快速失败。
pub fn validate(row: &ImportRow, row_index: usize, settings: &Settings) -> Vec<ValidationError> {
    if row.is_empty() {
        return Vec::new();
    }

    let mut errors = Vec::new();

    // ========== 必填字段 ==========
    let required = [
        ("BillNumber", &row.bill_number, "Bill number is required"),
        ("ProjectName", &row.project_name, "Project name is required"),
        ("CustomerName", &row.customer_name, "Customer name is required"),
        ("VendorName", &row.vendor_name, "Vendor name is required"),
    ];
    for (field, value, message) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(row_index, field, message));
        }
    }

    // ========== 日期 ==========
    if parse_date(&row.bill_date, settings.strict_date_parsing).is_none() {
        errors.push(ValidationError::new(
            row_index,
            "BillDate",
            format!("Invalid or missing date: \"{}\"", row.bill_date.trim()),
        ));
    }
    if parse_date(&row.invoice_date, settings.strict_date_parsing).is_none() {
        errors.push(ValidationError::new(
            row_index,
            "InvoiceDate",
            format!("Invalid or missing date: \"{}\"", row.invoice_date.trim()),
        ));
    }

    // ========== 金额 ==========
    match parse_amount(&row.bill_line_amount) {
        None => errors.push(ValidationError::new(
            row_index,
            "BillLineAmount",
            format!("Invalid amount: \"{}\"", row.bill_line_amount.trim()),
        )),
        Some(amount) if amount < BigDecimal::zero() => errors.push(ValidationError::new(
            row_index,
            "BillLineAmount",
            "Amount must be non-negative",
        )),
        Some(_) => {}
    }

    // ========== 币种 ==========
    let currency = settings.effective_currency(&row.currency);
    if !currency_re().is_match(&currency) {
        errors.push(ValidationError::new(
            row_index,
            "Currency",
            format!("Invalid currency code: \"{}\"", currency),
        ));
    }

    errors
}
