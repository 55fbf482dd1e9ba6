//! 外部 API 故障模型
//!
//! 远端返回的是不透明故障对象；这里只认两件事：
//! 特定的限流代码（可重试），以及稳定的消息提取顺序。

use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::fmt;

/// 标记限流的故障代码，命中即可重试
pub const RATE_LIMIT_CODE: &str = "too_many_requests";

/// 结构化故障明细
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FaultDetail {
    pub message: Option<String>,
    pub detail: Option<String>,
}

/// 外部 API 故障
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiFault {
    pub code: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub details: Vec<FaultDetail>,
    /// 传输层错误的原始文本（未到达结构化故障就失败时）
    #[serde(skip)]
    pub raw: Option<String>,
    /// 无法识别的响应负载，留作最后的兜底
    #[serde(skip)]
    pub payload: Option<JsonValue>,
}

impl ApiFault {
    /// 传输层错误
    pub fn transport(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            ..Default::default()
        }
    }

    /// 带代码和消息的结构化故障
    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// 限流故障
    pub fn rate_limited() -> Self {
        Self {
            code: Some(RATE_LIMIT_CODE.to_string()),
            message: Some("Too many requests".to_string()),
            ..Default::default()
        }
    }

    /// 是否为可重试的限流故障
    pub fn is_rate_limited(&self) -> bool {
        self.code.as_deref() == Some(RATE_LIMIT_CODE)
    }

    /// 提取人类可读消息
    ///
    /// 顺序固定：message 字段 → 原始文本 → 第一条明细的 message / detail
    /// → 序列化负载 → Debug 兜底。错误文本的稳定性依赖这个顺序。
    pub fn message_text(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        if let Some(raw) = &self.raw {
            return raw.clone();
        }
        if let Some(first) = self.details.first() {
            if let Some(text) = first.message.as_ref().or(first.detail.as_ref()) {
                return text.clone();
            }
        }
        if let Some(payload) = &self.payload {
            return payload.to_string();
        }
        format!("{:?}", self)
    }
}

impl fmt::Display for ApiFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message_text())
    }
}

impl std::error::Error for ApiFault {}
