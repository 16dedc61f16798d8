// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 工作单元
///
/// 一次商品抓取的最小调度单位。除 `attempt_count` 在重试时自增之外，
/// 其余字段在入队后不再变化。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkItem {
    /// 目标站点标识
    pub site: String,
    /// 所属遍历范围编号
    pub scope_id: String,
    /// 站点内商品编号
    pub item_id: String,
    /// 已消耗的重试次数，首次尝试前为 0
    pub attempt_count: u32,
}

impl WorkItem {
    pub fn new(site: impl Into<String>, scope_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            scope_id: scope_id.into(),
            item_id: item_id.into(),
            attempt_count: 0,
        }
    }

    /// 记录一次重试
    pub fn mark_retry(&mut self) {
        self.attempt_count += 1;
    }
}
