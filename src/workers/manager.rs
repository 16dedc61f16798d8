// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::crawler::stats::RunStats;
use crate::domain::sinks::record_sink::RecordSink;
use crate::infrastructure::reporter::FailureReporter;
use crate::queue::commit_queue::{self, CommitQueue};
use crate::workers::commit_worker::CommitWorker;

/// 存储协调器
///
/// 持有提交队列并运行一组存储工作者。关闭时先让队列排空，
/// 再等待全部工作者退出，保证摘要生成时没有悬而未决的写入。
pub struct StorageCoordinator {
    queue: CommitQueue,
    handles: Vec<JoinHandle<()>>,
}

impl StorageCoordinator {
    /// 启动协调器并立即开始消费
    ///
    /// # 参数
    /// * `queue_capacity` - 提交队列容量，写满后对抓取侧背压
    /// * `worker_count` - 存储工作者数量，至少为 1
    pub fn start(
        sinks: Vec<Arc<dyn RecordSink>>,
        reporter: Arc<FailureReporter>,
        stats: Arc<RunStats>,
        queue_capacity: usize,
        worker_count: usize,
    ) -> Self {
        let (queue, receiver) = commit_queue::bounded(queue_capacity);
        let worker_count = worker_count.max(1);

        let mut handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let worker = CommitWorker::new(id, sinks.clone(), reporter.clone(), stats.clone());
            let receiver = receiver.clone();
            handles.push(tokio::spawn(async move { worker.run(receiver).await }));
        }

        info!(
            workers = worker_count,
            capacity = queue_capacity,
            sinks = sinks.len(),
            "storage coordinator started"
        );
        Self { queue, handles }
    }

    /// 抓取侧使用的入队句柄
    pub fn queue(&self) -> CommitQueue {
        self.queue.clone()
    }

    /// 关闭队列并等待排空
    pub async fn shutdown(self) {
        let Self { queue, handles } = self;
        drop(queue);
        for handle in handles {
            if let Err(join_error) = handle.await {
                error!(%join_error, "commit worker panicked");
            }
        }
        debug!("storage coordinator drained");
    }
}
