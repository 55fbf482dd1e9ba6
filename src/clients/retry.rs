//! 限流重试
//!
//! 退避策略是一个通用包装器，通过 `Retrying<A>` 统一套在
//! 适配器的每个方法上，而不是散落在各调用点。
//! 只有限流故障会重试；其他故障立即原样传播。

use crate::clients::api::{AccountingApi, AttachableEntity};
use crate::clients::fault::ApiFault;
use crate::models::{BillDocument, EntityRef, InvoiceDocument};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// 指数退避策略
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 最大重试次数（不含首次调用）
    pub max_retries: usize,
    /// 基础等待时长，第 n 次重试前等待 base * 2^n
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// 第 retry_count 次重试前的等待时长
    pub fn delay_for(&self, retry_count: usize) -> Duration {
        self.base_delay * 2u32.pow(retry_count as u32)
    }

    /// 执行一次外部调用，限流时按退避重试
    ///
    /// 重试耗尽后返回最后一次的原始故障，不做任何改写。
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ApiFault>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiFault>>,
    {
        let mut retry_count = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(fault) if fault.is_rate_limited() && retry_count < self.max_retries => {
                    let delay = self.delay_for(retry_count);
                    warn!(
                        "API 频率限制 (尝试 {}/{}), 等待 {}ms 后重试...",
                        retry_count + 1,
                        self.max_retries,
                        delay.as_millis()
                    );
                    sleep(delay).await;
                    retry_count += 1;
                }
                Err(fault) => return Err(fault),
            }
        }
    }
}

/// 给任意适配器统一加上重试的装饰器
#[derive(Debug, Clone)]
pub struct Retrying<A> {
    inner: A,
    policy: RetryPolicy,
}

impl<A> Retrying<A> {
    pub fn new(inner: A, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// 使用默认策略（3 次重试，1000ms 基础等待）
    pub fn with_default(inner: A) -> Self {
        Self::new(inner, RetryPolicy::default())
    }
}

impl<A: AccountingApi> AccountingApi for Retrying<A> {
    async fn find_customer_by_name(&self, name: &str) -> Result<Option<EntityRef>, ApiFault> {
        self.policy.run(|| self.inner.find_customer_by_name(name)).await
    }

    async fn create_customer(
        &self,
        name: &str,
        parent_id: Option<&str>,
    ) -> Result<EntityRef, ApiFault> {
        self.policy.run(|| self.inner.create_customer(name, parent_id)).await
    }

    async fn find_vendor_by_name(&self, name: &str) -> Result<Option<EntityRef>, ApiFault> {
        self.policy.run(|| self.inner.find_vendor_by_name(name)).await
    }

    async fn create_vendor(&self, name: &str) -> Result<EntityRef, ApiFault> {
        self.policy.run(|| self.inner.create_vendor(name)).await
    }

    async fn find_department_by_name(&self, name: &str) -> Result<Option<EntityRef>, ApiFault> {
        self.policy.run(|| self.inner.find_department_by_name(name)).await
    }

    async fn find_class_by_name(&self, name: &str) -> Result<Option<EntityRef>, ApiFault> {
        self.policy.run(|| self.inner.find_class_by_name(name)).await
    }

    async fn default_expense_account(&self) -> Result<EntityRef, ApiFault> {
        self.policy.run(|| self.inner.default_expense_account()).await
    }

    async fn create_bill(&self, doc: &BillDocument) -> Result<String, ApiFault> {
        self.policy.run(|| self.inner.create_bill(doc)).await
    }

    async fn create_invoice_from_billable_expenses(
        &self,
        doc: &InvoiceDocument,
    ) -> Result<String, ApiFault> {
        self.policy
            .run(|| self.inner.create_invoice_from_billable_expenses(doc))
            .await
    }

    async fn upload_attachment(
        &self,
        filename: &str,
        content: &[u8],
        entity: AttachableEntity,
        entity_id: &str,
    ) -> Result<String, ApiFault> {
        self.policy
            .run(|| self.inner.upload_attachment(filename, content, entity, entity_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn backoff_delays_are_1s_2s_4s() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
    }

    #[tokio::test]
    async fn rate_limit_retries_then_succeeds() {
        // 基础等待压到 10ms，避免测试变慢
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(10),
        };
        let attempts = Cell::new(0usize);

        let result: Result<u32, ApiFault> = policy
            .run(|| {
                let n = attempts.get();
                attempts.set(n + 1);
                async move {
                    if n < 3 {
                        Err(ApiFault::rate_limited())
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.get(), 4);
    }

    #[tokio::test]
    async fn exhausted_retries_propagate_the_original_fault() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
        };
        let attempts = Cell::new(0usize);

        let result: Result<u32, ApiFault> = policy
            .run(|| {
                attempts.set(attempts.get() + 1);
                async { Err(ApiFault::rate_limited()) }
            })
            .await;

        let fault = result.unwrap_err();
        assert!(fault.is_rate_limited());
        // 首次调用 + 3 次重试
        assert_eq!(attempts.get(), 4);
    }

    #[test]
    fn non_rate_limit_fault_is_not_retried() {
        let policy = RetryPolicy::default();
        let attempts = Cell::new(0usize);

        let result: Result<u32, ApiFault> = tokio_test::block_on(policy.run(|| {
            attempts.set(attempts.get() + 1);
            async { Err(ApiFault::with_code("invalid_field", "bad request")) }
        }));

        assert_eq!(result.unwrap_err().message_text(), "bad request");
        assert_eq!(attempts.get(), 1);
    }
}
