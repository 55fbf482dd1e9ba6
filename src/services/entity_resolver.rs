//! 实体解析服务 - 业务能力层
//!
//! 针对外部系统的"查找或创建"语义。
//! 缓存不只是性能优化：同一批次内先创建再查不到会导致重复建档，
//! 所以创建结果必须立即进入缓存。

use crate::clients::api::AccountingApi;
use crate::error::{AppError, AppResult, EntityKind};
use crate::models::EntityRef;
use std::collections::HashMap;
use tracing::info;

/// 实体解析器
///
/// 缓存的生命周期与编排器实例一致；
/// 单写者顺序访问，不需要额外同步。
#[derive(Debug, Default)]
pub struct EntityResolver {
    customers: HashMap<String, EntityRef>,
    /// (父客户 ID, 项目名) → 子客户
    sub_customers: HashMap<(String, String), EntityRef>,
    vendors: HashMap<String, EntityRef>,
    /// 可选实体连"未找到"也缓存，避免反复查询
    departments: HashMap<String, Option<EntityRef>>,
    classes: HashMap<String, Option<EntityRef>>,
    expense_account: Option<EntityRef>,
}

impl EntityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析顶级客户
    ///
    /// 未找到时：开启 auto_create 则创建，否则报 EntityNotFound
    /// （由编排层转成 needs_review，绝不静默创建）。
    pub async fn resolve_customer<A: AccountingApi>(
        &mut self,
        api: &A,
        name: &str,
        auto_create: bool,
    ) -> AppResult<EntityRef> {
        if let Some(hit) = self.customers.get(name) {
            return Ok(hit.clone());
        }

        if let Some(found) = api.find_customer_by_name(name).await? {
            self.customers.insert(name.to_string(), found.clone());
            return Ok(found);
        }

        if !auto_create {
            return Err(AppError::entity_not_found(EntityKind::Customer, name));
        }

        let created = api.create_customer(name, None).await?;
        info!("✓ 已创建客户: {}", name);
        self.customers.insert(name.to_string(), created.clone());
        Ok(created)
    }

    /// 解析子客户（项目）
    ///
    /// 项目视为总是可以安全创建，不受 auto_create 限制。
    pub async fn resolve_sub_customer<A: AccountingApi>(
        &mut self,
        api: &A,
        parent: &EntityRef,
        name: &str,
    ) -> AppResult<EntityRef> {
        let key = (parent.id.clone(), name.to_string());
        if let Some(hit) = self.sub_customers.get(&key) {
            return Ok(hit.clone());
        }

        let resolved = match api.find_customer_by_name(name).await? {
            Some(found) => found,
            None => {
                let created = api.create_customer(name, Some(&parent.id)).await?;
                info!("✓ 已创建项目: {} (客户: {})", name, parent.name);
                created
            }
        };

        self.sub_customers.insert(key, resolved.clone());
        Ok(resolved)
    }

    /// 解析供应商（策略与顶级客户一致）
    pub async fn resolve_vendor<A: AccountingApi>(
        &mut self,
        api: &A,
        name: &str,
        auto_create: bool,
    ) -> AppResult<EntityRef> {
        if let Some(hit) = self.vendors.get(name) {
            return Ok(hit.clone());
        }

        if let Some(found) = api.find_vendor_by_name(name).await? {
            self.vendors.insert(name.to_string(), found.clone());
            return Ok(found);
        }

        if !auto_create {
            return Err(AppError::entity_not_found(EntityKind::Vendor, name));
        }

        let created = api.create_vendor(name).await?;
        info!("✓ 已创建供应商: {}", name);
        self.vendors.insert(name.to_string(), created.clone());
        Ok(created)
    }

    /// 解析部门（可选实体，未找到返回 None，不报错不告警）
    pub async fn resolve_department<A: AccountingApi>(
        &mut self,
        api: &A,
        name: &str,
    ) -> AppResult<Option<EntityRef>> {
        if name.is_empty() {
            return Ok(None);
        }
        if let Some(cached) = self.departments.get(name) {
            return Ok(cached.clone());
        }

        let found = api.find_department_by_name(name).await?;
        self.departments.insert(name.to_string(), found.clone());
        Ok(found)
    }

    /// 解析类别（可选实体，同部门）
    pub async fn resolve_class<A: AccountingApi>(
        &mut self,
        api: &A,
        name: &str,
    ) -> AppResult<Option<EntityRef>> {
        if name.is_empty() {
            return Ok(None);
        }
        if let Some(cached) = self.classes.get(name) {
            return Ok(cached.clone());
        }

        let found = api.find_class_by_name(name).await?;
        self.classes.insert(name.to_string(), found.clone());
        Ok(found)
    }

    /// 默认费用科目（每个批次最多取一次）
    pub async fn expense_account<A: AccountingApi>(&mut self, api: &A) -> AppResult<EntityRef> {
        if let Some(hit) = &self.expense_account {
            return Ok(hit.clone());
        }
        let account = api.default_expense_account().await?;
        self.expense_account = Some(account.clone());
        Ok(account)
    }
}
