// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::domain::models::summary::{RunSummary, ScopeCounts};

/// 运行统计累加器
///
/// 计数器可被并发抓取任务与提交工作者安全递增，
/// 快照在提交队列排空之后生成。
pub struct RunStats {
    succeeded: AtomicU64,
    failed: AtomicU64,
    skipped_duplicates: AtomicU64,
    sink_failures: AtomicU64,
    scopes: Mutex<BTreeMap<String, ScopeCounts>>,
    skipped_scopes: Mutex<Vec<String>>,
    started: Instant,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            skipped_duplicates: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            scopes: Mutex::new(BTreeMap::new()),
            skipped_scopes: Mutex::new(Vec::new()),
            started: Instant::now(),
        }
    }

    pub fn record_success(&self, scope_id: &str) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        self.scopes.lock().entry(scope_id.to_string()).or_default().succeeded += 1;
    }

    pub fn record_failure(&self, scope_id: &str) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.scopes.lock().entry(scope_id.to_string()).or_default().failed += 1;
    }

    pub fn record_duplicates(&self, scope_id: &str, count: u64) {
        self.skipped_duplicates.fetch_add(count, Ordering::Relaxed);
        self.scopes
            .lock()
            .entry(scope_id.to_string())
            .or_default()
            .skipped_duplicates += count;
    }

    pub fn record_sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录因连续失败或列表失败被放弃的范围
    pub fn record_skipped_scope(&self, scope_id: &str) {
        self.skipped_scopes.lock().push(scope_id.to_string());
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn skipped_duplicates(&self) -> u64 {
        self.skipped_duplicates.load(Ordering::Relaxed)
    }

    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    /// 汇总为运行摘要
    pub fn snapshot(&self, run_id: Uuid, site: &str, failure_log: Option<PathBuf>) -> RunSummary {
        RunSummary {
            run_id,
            site: site.to_string(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            skipped_duplicates: self.skipped_duplicates(),
            sink_failures: self.sink_failures(),
            scopes: self.scopes.lock().clone(),
            skipped_scopes: self.skipped_scopes.lock().clone(),
            failure_log,
            elapsed_ms: self.started.elapsed().as_millis() as u64,
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}
