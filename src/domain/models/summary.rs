// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 单个范围的处理计数
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeCounts {
    /// 成功抓取的商品数
    pub succeeded: u64,
    /// 终态失败的商品数
    pub failed: u64,
    /// 因重复而跳过的商品数
    pub skipped_duplicates: u64,
}

/// 运行摘要
///
/// 一次运行结束时的最终统计，在提交队列排空之后生成。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// 运行编号
    pub run_id: Uuid,
    /// 目标站点
    pub site: String,
    /// 成功总数
    pub succeeded: u64,
    /// 失败总数
    pub failed: u64,
    /// 重复跳过总数
    pub skipped_duplicates: u64,
    /// 存储端写入失败次数，不计入商品失败
    pub sink_failures: u64,
    /// 按范围编号排列的分项计数
    pub scopes: BTreeMap<String, ScopeCounts>,
    /// 因连续失败被整范围跳过的范围编号
    pub skipped_scopes: Vec<String>,
    /// 失败日志路径，没有失败时为 None
    pub failure_log: Option<PathBuf>,
    /// 运行耗时，毫秒
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// 运行是否完全干净，没有任何失败
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.sink_failures == 0 && self.skipped_scopes.is_empty()
    }
}
