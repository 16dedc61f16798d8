// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::json;
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};
use uuid::Uuid;

use crate::domain::models::failure::FailureRecord;

/// 失败报告器
///
/// 将终态失败同时写入两个出口：人读的结构化日志行与机读的
/// 按运行隔离的 JSONL 文件。报告自身绝不抛错，文件不可写时
/// 退化为仅写进程日志。
pub struct FailureReporter {
    path: PathBuf,
    id_field: String,
    written: AtomicU64,
}

impl FailureReporter {
    /// 在报告目录下创建本次运行的报告器
    ///
    /// 文件名为 `failures-{run_id}.jsonl`，目录不存在时创建。
    pub async fn create(
        dir: &Path,
        run_id: Uuid,
        id_field: &str,
    ) -> Result<Self, std::io::Error> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(Self {
            path: dir.join(format!("failures-{}.jsonl", run_id)),
            id_field: id_field.to_string(),
            written: AtomicU64::new(0),
        })
    }

    /// 报告一条终态失败
    pub async fn report(&self, record: &FailureRecord) {
        warn!(
            site = %record.site,
            item_id = %record.item_id,
            reason = %record.reason,
            attempts = record.attempt_count,
            "work item failed"
        );

        let mut line = json!({
            "reason": record.reason.to_string(),
            "attempt_count": record.attempt_count,
            "trace": record.trace,
            "timestamp": record.timestamp.to_rfc3339(),
        });
        line[self.id_field.as_str()] = json!(record.item_id);
        if let Some(scope_id) = &record.scope_id {
            line["scope_id"] = json!(scope_id);
        }

        if let Err(io_error) = self.append_line(&line.to_string()).await {
            // 最后手段:确保失败信息至少出现在进程日志里
            error!(%io_error, payload = %line, "failure log unwritable");
            return;
        }
        self.written.fetch_add(1, Ordering::Relaxed);
    }

    async fn append_line(&self, line: &str) -> Result<(), std::io::Error> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok(())
    }

    /// 已写入的失败条数
    pub fn failures_written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// 失败日志路径，尚无失败时为 None
    pub fn log_path(&self) -> Option<PathBuf> {
        if self.failures_written() > 0 {
            Some(self.path.clone())
        } else {
            None
        }
    }
}
