//! 幂等存储
//!
//! 已处理键的存放位置是一个显式注入点：
//! 默认实现只在进程内记忆（一次运行内防止重复提交），
//! 是否需要跨运行持久化由调用方换一个实现来决定。

use std::collections::HashSet;

/// 会话级幂等存储接口
pub trait IdempotencyStore {
    /// 该键是否已处理过
    fn contains(&self, key: &str) -> bool;

    /// 标记该键已处理
    fn insert(&mut self, key: String);
}

/// 进程内幂等存储（默认实现）
#[derive(Debug, Default)]
pub struct InMemoryIdempotencyStore {
    keys: HashSet<String>,
}

impl IdempotencyStore for InMemoryIdempotencyStore {
    fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    fn insert(&mut self, key: String) {
        self.keys.insert(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_remembers_keys() {
        let mut store = InMemoryIdempotencyStore::default();
        assert!(!store.contains("bill_B1"));
        store.insert("bill_B1".to_string());
        assert!(store.contains("bill_B1"));
    }
}
