//! Interaction ID 生成策略
//!
//! 由编排服务在构造时注入，不依赖时钟精度。

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::entity::InteractionId;

/// ID 生成策略
pub trait IdGenerator: Send + Sync + 'static {
    /// 生成一个新的、全局唯一的 ID
    fn next_id(&self) -> InteractionId;
}

/// 随机 128 位 UUID (v4)
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> InteractionId {
        Uuid::new_v4().to_string()
    }
}

/// 单调计数器，前缀区分进程实例
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// 从指定序号之后继续计数
    pub fn starting_after(prefix: impl Into<String>, last: u64) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(last),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> InteractionId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{:016}", self.prefix, n)
    }
}
