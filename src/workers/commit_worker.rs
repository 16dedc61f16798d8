// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::crawler::stats::RunStats;
use crate::domain::models::failure::FailureRecord;
use crate::domain::models::product::ProductRecord;
use crate::domain::sinks::record_sink::RecordSink;
use crate::infrastructure::reporter::FailureReporter;
use crate::queue::commit_queue::CommitReceiver;

/// 存储工作者
///
/// 循环消费提交队列，把每条记录依次写入全部存储端。
/// 单个存储端失败只记录，不影响其余存储端与后续记录。
pub struct CommitWorker {
    id: usize,
    sinks: Vec<Arc<dyn RecordSink>>,
    reporter: Arc<FailureReporter>,
    stats: Arc<RunStats>,
}

impl CommitWorker {
    pub fn new(
        id: usize,
        sinks: Vec<Arc<dyn RecordSink>>,
        reporter: Arc<FailureReporter>,
        stats: Arc<RunStats>,
    ) -> Self {
        Self {
            id,
            sinks,
            reporter,
            stats,
        }
    }

    /// 消费循环，队列关闭并排空后返回
    pub async fn run(self, receiver: CommitReceiver) {
        debug!(worker = self.id, "commit worker started");
        while let Some(record) = receiver.recv().await {
            self.commit_record(&record).await;
        }
        debug!(worker = self.id, "commit worker drained");
    }

    /// 向全部存储端提交一条记录
    async fn commit_record(&self, record: &ProductRecord) {
        for sink in &self.sinks {
            match sink.commit(record).await {
                Ok(()) => {
                    debug!(
                        worker = self.id,
                        sink = sink.name(),
                        item_id = %record.item_id,
                        "record committed"
                    );
                }
                Err(error) => {
                    warn!(
                        worker = self.id,
                        sink = sink.name(),
                        item_id = %record.item_id,
                        %error,
                        "sink commit failed"
                    );
                    self.stats.record_sink_failure();
                    let failure = FailureRecord::from_commit_failure(
                        record,
                        format!("{}: {}", sink.name(), error),
                    );
                    self.reporter.report(&failure).await;
                }
            }
        }
    }
}
