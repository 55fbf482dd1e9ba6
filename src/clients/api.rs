//! 记账系统适配器接口
//!
//! 所有外部调用都经过这一个接口；认证、传输和 JSON 编码
//! 由具体实现负责，管线只依赖这里的语义。

use crate::clients::fault::ApiFault;
use crate::models::{BillDocument, EntityRef, InvoiceDocument};

/// 可挂附件的单据类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachableEntity {
    Bill,
    Invoice,
}

impl AttachableEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachableEntity::Bill => "bill",
            AttachableEntity::Invoice => "invoice",
        }
    }
}

/// 记账系统适配器
///
/// 查找一律按名称精确匹配（大小写敏感），找不到返回 None 而不是故障。
#[allow(async_fn_in_trait)]
pub trait AccountingApi {
    /// 按名称精确查找顶级客户
    async fn find_customer_by_name(&self, name: &str) -> Result<Option<EntityRef>, ApiFault>;

    /// 创建客户；给出 parent_id 时创建为其下的子客户（项目）
    async fn create_customer(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<EntityRef, ApiFault>;

    /// 按名称精确查找供应商
    async fn find_vendor_by_name(&self, name: &str) -> Result<Option<EntityRef>, ApiFault>;

    /// 创建供应商
    async fn create_vendor(&self, name: &str) -> Result<EntityRef, ApiFault>;

    /// 按名称精确查找部门
    async fn find_department_by_name(&self, name: &str) -> Result<Option<EntityRef>, ApiFault>;

    /// 按名称精确查找类别
    async fn find_class_by_name(&self, name: &str) -> Result<Option<EntityRef>, ApiFault>;

    /// 获取默认费用科目
    async fn default_expense_account(&self) -> Result<EntityRef, ApiFault>;

    /// 创建账单，返回账单 ID
    async fn create_bill(&self, doc: &BillDocument) -> Result<String, ApiFault>;

    /// 从可开票费用创建发票，返回发票 ID
    async fn create_invoice_from_billable_expenses(
        &self,
        doc: &InvoiceDocument,
    ) -> Result<String, ApiFault>;

    /// 上传附件并挂到指定单据，返回附件 ID
    async fn upload_attachment(
        &self,
        filename: &str,
        content: &[u8],
        entity: AttachableEntity,
        entity_id: &str,
    ) -> Result<String, ApiFault>;
}
