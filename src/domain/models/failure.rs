// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::product::ProductRecord;
use crate::domain::models::work_item::WorkItem;
use crate::utils::errors::CrawlError;

/// 终态失败原因
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// 页面或会话无法建立
    LoadFailure,
    /// 页面已响应但预期内容未出现
    ReadinessTimeout,
    /// 必需字段缺失
    ExtractionIncomplete,
    /// 疑似限流或封禁
    RateLimitSuspected,
    /// 存储端写入失败
    StorageSinkFailure,
    /// 未能在时限内获取会话租约
    PoolExhaustionTimeout,
}

impl FailureReason {
    /// 由爬取错误归类失败原因
    ///
    /// 取消不是失败，返回 None，不产生失败记录。
    pub fn classify(error: &CrawlError) -> Option<Self> {
        match error {
            CrawlError::LoadFailure(_) => Some(FailureReason::LoadFailure),
            CrawlError::ReadinessTimeout(_) => Some(FailureReason::ReadinessTimeout),
            CrawlError::ExtractionIncomplete(_) => Some(FailureReason::ExtractionIncomplete),
            CrawlError::RateLimitSuspected(_) => Some(FailureReason::RateLimitSuspected),
            CrawlError::StorageSinkFailure(_) => Some(FailureReason::StorageSinkFailure),
            CrawlError::PoolExhaustionTimeout(_) => Some(FailureReason::PoolExhaustionTimeout),
            CrawlError::Cancelled => None,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::LoadFailure => write!(f, "load_failure"),
            FailureReason::ReadinessTimeout => write!(f, "readiness_timeout"),
            FailureReason::ExtractionIncomplete => write!(f, "extraction_incomplete"),
            FailureReason::RateLimitSuspected => write!(f, "rate_limit_suspected"),
            FailureReason::StorageSinkFailure => write!(f, "storage_sink_failure"),
            FailureReason::PoolExhaustionTimeout => write!(f, "pool_exhaustion_timeout"),
        }
    }
}

impl FromStr for FailureReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "load_failure" => Ok(FailureReason::LoadFailure),
            "readiness_timeout" => Ok(FailureReason::ReadinessTimeout),
            "extraction_incomplete" => Ok(FailureReason::ExtractionIncomplete),
            "rate_limit_suspected" => Ok(FailureReason::RateLimitSuspected),
            "storage_sink_failure" => Ok(FailureReason::StorageSinkFailure),
            "pool_exhaustion_timeout" => Ok(FailureReason::PoolExhaustionTimeout),
            _ => Err(format!("unknown failure reason: {}", s)),
        }
    }
}

/// 失败记录
///
/// 某个工作单元耗尽全部尝试后的终态描述，每个失败单元恰好产生一条。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    /// 目标站点
    pub site: String,
    /// 所属范围，入库阶段的失败没有范围上下文
    pub scope_id: Option<String>,
    /// 商品编号
    pub item_id: String,
    /// 失败前累计消耗的重试次数
    pub attempt_count: u32,
    /// 归类后的失败原因
    pub reason: FailureReason,
    /// 可选的诊断文本
    pub trace: Option<String>,
    /// 记录时间
    pub timestamp: DateTime<Utc>,
}

impl FailureRecord {
    /// 由终态爬取错误构造失败记录
    ///
    /// 取消返回 None。
    pub fn from_error(item: &WorkItem, error: &CrawlError) -> Option<Self> {
        let reason = FailureReason::classify(error)?;
        Some(Self {
            site: item.site.clone(),
            scope_id: Some(item.scope_id.clone()),
            item_id: item.item_id.clone(),
            attempt_count: item.attempt_count,
            reason,
            trace: Some(error.to_string()),
            timestamp: Utc::now(),
        })
    }

    /// 由入库失败构造失败记录
    pub fn from_commit_failure(record: &ProductRecord, trace: impl Into<String>) -> Self {
        Self {
            site: record.source_site.clone(),
            scope_id: None,
            item_id: record.item_id.clone(),
            attempt_count: 0,
            reason: FailureReason::StorageSinkFailure,
            trace: Some(trace.into()),
            timestamp: Utc::now(),
        }
    }
}
