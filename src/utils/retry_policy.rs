// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use crate::utils::errors::CrawlError;

/// 重试策略
///
/// 普通可重试错误使用固定间隔，限流信号按尝试次数指数放大并受上限约束。
/// 不可重试错误立即终止，重试次数从不超过 `max_retries`。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大重试次数，不含首次尝试
    pub max_retries: u32,
    /// 普通错误的固定重试间隔
    pub retry_delay: Duration,
    /// 限流退避的上限
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
            ..Default::default()
        }
    }

    /// 判断某次失败后是否还应重试
    ///
    /// # 参数
    /// * `error` - 本次尝试的失败原因
    /// * `attempt` - 已完成的尝试序号，从 0 开始
    pub fn should_retry(&self, error: &CrawlError, attempt: u32) -> bool {
        error.is_retryable() && attempt < self.max_retries
    }

    /// 计算下一次尝试前的等待时长
    ///
    /// 限流错误等待 `retry_delay * 2^(attempt + 1)`，其余错误等待固定间隔。
    pub fn delay_for(&self, error: &CrawlError, attempt: u32) -> Duration {
        if error.is_rate_limit() {
            let factor = 2u32.saturating_pow(attempt.saturating_add(1));
            let escalated = self.retry_delay.saturating_mul(factor);
            escalated.min(self.max_backoff)
        } else {
            self.retry_delay
        }
    }
}
