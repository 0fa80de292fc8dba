//! 后端调用并发限流器
//!
//! 限制同一后端的在途请求数量，排队超时即视为后端不可用。

use std::time::Duration;

use tokio::sync::{Semaphore, SemaphorePermit};

/// 限流配置
#[derive(Debug, Clone)]
pub struct CallLimiterConfig {
    /// 最大并发在途调用数
    pub max_concurrent: usize,
    /// 排队最长等待时间
    pub max_wait: Duration,
}

impl Default for CallLimiterConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 32,
            max_wait: Duration::from_secs(30),
        }
    }
}

/// 调用限流器
#[derive(Debug)]
pub struct CallLimiter {
    /// 并发控制信号量
    semaphore: Semaphore,
    /// 配置
    config: CallLimiterConfig,
}

impl CallLimiter {
    /// 创建新的限流器
    pub fn new(config: CallLimiterConfig) -> Self {
        let semaphore = Semaphore::new(config.max_concurrent.max(1));
        Self { semaphore, config }
    }

    /// 创建默认配置的限流器
    pub fn default_limiter() -> Self {
        Self::new(CallLimiterConfig::default())
    }

    /// 获取调用许可 (异步等待)，许可在 drop 时归还
    pub async fn acquire(&self) -> crate::Result<SemaphorePermit<'_>> {
        tokio::time::timeout(self.config.max_wait, self.semaphore.acquire())
            .await
            .map_err(|_| {
                crate::VeritasError::BackendUnavailable(format!(
                    "no call slot freed within {:?}",
                    self.config.max_wait
                ))
            })?
            .map_err(|_| crate::VeritasError::BackendUnavailable("call limiter closed".to_string()))
    }

    /// 尝试获取许可 (非阻塞)
    pub fn try_acquire(&self) -> crate::Result<SemaphorePermit<'_>> {
        self.semaphore.try_acquire().map_err(|_| {
            crate::VeritasError::BackendUnavailable("all call slots are busy".to_string())
        })
    }

    /// 当前可用许可数
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// 获取配置
    pub fn config(&self) -> &CallLimiterConfig {
        &self.config
    }
}
