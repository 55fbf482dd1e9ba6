//! 记账 API HTTP 客户端
//!
//! 封装所有与记账系统相关的 HTTP 调用。
//! 响应信封统一为 `{"data": ...}`，故障为 `{"error": {...}}`；
//! HTTP 429 与信封内的限流代码都映射为可重试故障。

use crate::clients::api::{AccountingApi, AttachableEntity};
use crate::clients::fault::ApiFault;
use crate::config::Config;
use crate::models::{BillDocument, EntityRef, Environment, InvoiceDocument};
use serde_json::{json, Value as JsonValue};
use tracing::debug;

/// 记账 API 客户端
#[derive(Debug, Clone)]
pub struct HttpAccountingClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpAccountingClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// 根据配置和目标环境创建客户端
    pub fn from_config(config: &Config, environment: Environment) -> Self {
        let base_url = match environment {
            Environment::Sandbox => config.api_base_url_sandbox.clone(),
            Environment::Production => config.api_base_url_production.clone(),
        };
        Self::new(base_url, config.api_token.clone())
    }

    async fn post(&self, path: &str, body: JsonValue) -> Result<JsonValue, ApiFault> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("POST {} Payload: {}", url, body);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiFault::transport(e.to_string()))?;

        Self::parse_response(response).await
    }

    async fn get(&self, path: &str) -> Result<JsonValue, ApiFault> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ApiFault::transport(e.to_string()))?;

        Self::parse_response(response).await
    }

    /// 解包响应信封，故障映射为 ApiFault
    async fn parse_response(response: reqwest::Response) -> Result<JsonValue, ApiFault> {
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiFault::rate_limited());
        }

        let payload: JsonValue = response
            .json()
            .await
            .map_err(|e| ApiFault::transport(e.to_string()))?;

        if !status.is_success() {
            let fault = payload
                .get("error")
                .and_then(|e| serde_json::from_value::<ApiFault>(e.clone()).ok())
                .unwrap_or_else(|| ApiFault {
                    payload: Some(payload.clone()),
                    ..Default::default()
                });
            return Err(fault);
        }

        Ok(payload.get("data").cloned().unwrap_or(JsonValue::Null))
    }

    fn entity_from(data: JsonValue) -> Result<EntityRef, ApiFault> {
        serde_json::from_value(data.clone()).map_err(|_| ApiFault {
            payload: Some(data),
            ..Default::default()
        })
    }

    fn optional_entity_from(data: JsonValue) -> Result<Option<EntityRef>, ApiFault> {
        if data.is_null() {
            Ok(None)
        } else {
            Self::entity_from(data).map(Some)
        }
    }

    fn id_from(data: JsonValue) -> Result<String, ApiFault> {
        data.get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(ApiFault {
                payload: Some(data),
                ..Default::default()
            })
    }
}

impl AccountingApi for HttpAccountingClient {
    async fn find_customer_by_name(&self, name: &str) -> Result<Option<EntityRef>, ApiFault> {
        let data = self
            .post("customers/search", json!({ "name": name, "exact": true }))
            .await?;
        Self::optional_entity_from(data)
    }

    async fn create_customer(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<EntityRef, ApiFault> {
        let data = self
            .post(
                "customers",
                json!({
                    "name": name,
                    "parent_id": parent_id,
                    // 有父级的客户即为项目（job）
                    "is_project": parent_id.is_some(),
                }),
            )
            .await?;
        Self::entity_from(data)
    }

    async fn find_vendor_by_name(&self, name: &str) -> Result<Option<EntityRef>, ApiFault> {
        let data = self
            .post("vendors/search", json!({ "name": name, "exact": true }))
            .await?;
        Self::optional_entity_from(data)
    }

    async fn create_vendor(&self, name: &str) -> Result<EntityRef, ApiFault> {
        let data = self.post("vendors", json!({ "name": name })).await?;
        Self::entity_from(data)
    }

    async fn find_department_by_name(&self, name: &str) -> Result<Option<EntityRef>, ApiFault> {
        let data = self
            .post("departments/search", json!({ "name": name, "exact": true }))
            .await?;
        Self::optional_entity_from(data)
    }

    async fn find_class_by_name(&self, name: &str) -> Result<Option<EntityRef>, ApiFault> {
        let data = self
            .post("classes/search", json!({ "name": name, "exact": true }))
            .await?;
        Self::optional_entity_from(data)
    }

    async fn default_expense_account(&self) -> Result<EntityRef, ApiFault> {
        let data = self.get("accounts/default-expense").await?;
        Self::entity_from(data)
    }

    async fn create_bill(&self, doc: &BillDocument) -> Result<String, ApiFault> {
        let body = serde_json::to_value(doc).map_err(|e| ApiFault::transport(e.to_string()))?;
        let data = self.post("bills", body).await?;
        Self::id_from(data)
    }

    async fn create_invoice_from_billable_expenses(
        &self,
        doc: &InvoiceDocument,
    ) -> Result<String, ApiFault> {
        let body = serde_json::to_value(doc).map_err(|e| ApiFault::transport(e.to_string()))?;
        let data = self.post("invoices/from-billable-expenses", body).await?;
        Self::id_from(data)
    }

    async fn upload_attachment(
        &self,
        filename: &str,
        content: &[u8],
        entity: AttachableEntity,
        entity_id: &str,
    ) -> Result<String, ApiFault> {
        let url = format!("{}/attachments", self.base_url);
        debug!("上传附件 {} ({} 字节) → {} {}", filename, content.len(), entity.as_str(), entity_id);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .query(&[
                ("entity", entity.as_str()),
                ("entity_id", entity_id),
                ("filename", filename),
            ])
            .body(content.to_vec())
            .send()
            .await
            .map_err(|e| ApiFault::transport(e.to_string()))?;

        let data = Self::parse_response(response).await?;
        Self::id_from(data)
    }
}
