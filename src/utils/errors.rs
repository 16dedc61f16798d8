// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 爬取错误
///
/// 覆盖单个工作单元在获取、提取与入库过程中的全部失败类别。
/// 分类决定重试行为：可重试错误在耗尽尝试次数之前不会成为终态失败。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlError {
    /// 页面或会话无法建立
    #[error("page load failed: {0}")]
    LoadFailure(String),

    /// 页面已响应但预期内容在时限内未出现
    #[error("readiness condition not met: {0}")]
    ReadinessTimeout(String),

    /// 必需字段缺失，页面可能已改版或被部分屏蔽
    #[error("extraction incomplete, missing required field: {0}")]
    ExtractionIncomplete(String),

    /// 疑似触发站点限流或封禁
    #[error("rate limit suspected: {0}")]
    RateLimitSuspected(String),

    /// 某个存储端拒绝写入
    #[error("storage sink failure: {0}")]
    StorageSinkFailure(String),

    /// 在配置时限内未能获取会话租约
    #[error("session pool exhausted, no lease granted within {0}ms")]
    PoolExhaustionTimeout(u64),

    /// 运行被取消，剩余工作单元不再调度
    #[error("run cancelled")]
    Cancelled,
}

impl CrawlError {
    /// 判断错误是否允许重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CrawlError::LoadFailure(_)
                | CrawlError::ReadinessTimeout(_)
                | CrawlError::ExtractionIncomplete(_)
                | CrawlError::RateLimitSuspected(_)
        )
    }

    /// 判断是否为限流信号，限流采用更长的退避间隔
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, CrawlError::RateLimitSuspected(_))
    }
}
