//! 账单分组服务 - 业务能力层
//!
//! 把非空行按去空白后的账单编号分组。
//! 组的顺序取键首次出现的顺序，组内行保持输入顺序。

use crate::models::{BillGroup, ImportRow};
use indexmap::IndexMap;

/// 分组键
///
/// 缺失账单编号的行不再走单独的错误通道，
/// 而是各自成为一个隐式单行组，走同一条管线
/// （随后会在校验阶段因缺少账单编号而报错）。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Bill(String),
    Solo(usize),
}

/// 把行划分为有序的账单组
///
/// 空行在分组前被剔除，由编排层标记为 skipped。
pub fn group(rows: &[ImportRow]) -> Vec<BillGroup> {
    let mut groups: IndexMap<GroupKey, BillGroup> = IndexMap::new();

    for (index, row) in rows.iter().enumerate() {
        if row.is_empty() {
            continue;
        }

        let bill_number = row.bill_number.trim().to_string();
        let key = if bill_number.is_empty() {
            GroupKey::Solo(index)
        } else {
            GroupKey::Bill(bill_number.clone())
        };

        groups
            .entry(key)
            .or_insert_with(|| BillGroup {
                bill_number,
                rows: Vec::new(),
            })
            .rows
            .push((index, row.clone()));
    }

    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(bill_number: &str) -> ImportRow {
        ImportRow {
            bill_number: bill_number.to_string(),
            customer_name: "Acme".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let rows = vec![row("B2"), row("B1"), row("B2"), row("B1")];
        let groups = group(&rows);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].bill_number, "B2");
        assert_eq!(groups[0].row_indices(), vec![0, 2]);
        assert_eq!(groups[1].bill_number, "B1");
        assert_eq!(groups[1].row_indices(), vec![1, 3]);
    }

    #[test]
    fn bill_numbers_are_trimmed_before_grouping() {
        let rows = vec![row(" B1 "), row("B1")];
        let groups = group(&rows);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].bill_number, "B1");
        assert_eq!(groups[0].rows.len(), 2);
    }

    #[test]
    fn empty_rows_never_reach_a_group() {
        let rows = vec![row("B1"), ImportRow::default(), row("B1")];
        let groups = group(&rows);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].row_indices(), vec![0, 2]);
    }

    #[test]
    fn missing_bill_number_becomes_an_implicit_solo_group() {
        let rows = vec![row(""), row(""), row("B1")];
        let groups = group(&rows);

        assert_eq!(groups.len(), 3);
        assert!(groups[0].is_implicit());
        assert!(groups[1].is_implicit());
        assert_eq!(groups[0].row_indices(), vec![0]);
        assert_eq!(groups[1].row_indices(), vec![1]);
        assert_eq!(groups[2].bill_number, "B1");
        // 隐式组没有幂等键
        assert!(groups[0].idempotency_key().is_none());
        assert_eq!(groups[2].idempotency_key().as_deref(), Some("bill_B1"));
    }
}
