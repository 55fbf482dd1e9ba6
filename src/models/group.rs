//! 账单组模型

use crate::models::row::ImportRow;

/// 共享同一个账单编号的有序行集合
///
/// 不变量：非空；每组最多产生一张外部账单；
/// 账单级字段（供应商、客户、部门、日期）取第一行，
/// 行级字段（项目、金额、描述、类别）逐行取值。
#[derive(Debug, Clone)]
pub struct BillGroup {
    /// 去掉首尾空白的账单编号；隐式单行组为空字符串
    pub bill_number: String,
    /// (原始行索引, 行) 按输入顺序排列
    pub rows: Vec<(usize, ImportRow)>,
}

impl BillGroup {
    /// 组内第一行（账单级字段的来源）
    ///
    /// 分组器保证组非空。
    pub fn first_row(&self) -> &ImportRow {
        &self.rows[0].1
    }

    /// 组内所有原始行索引
    pub fn row_indices(&self) -> Vec<usize> {
        self.rows.iter().map(|(idx, _)| *idx).collect()
    }

    /// 是否为缺失账单编号的隐式单行组
    pub fn is_implicit(&self) -> bool {
        self.bill_number.is_empty()
    }

    /// 幂等键（隐式组没有幂等键）
    pub fn idempotency_key(&self) -> Option<String> {
        if self.is_implicit() {
            None
        } else {
            Some(format!("bill_{}", self.bill_number))
        }
    }
}
