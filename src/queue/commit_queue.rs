// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

use crate::domain::models::product::ProductRecord;

/// 队列错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// 队列已关闭，运行进入收尾阶段
    #[error("commit queue closed")]
    Closed,
}

/// 提交队列发送端
///
/// 有界缓冲，队列满时 `push` 挂起，对抓取侧形成背压。
/// 全部发送端被丢弃后队列关闭，接收端排空剩余记录。
#[derive(Clone)]
pub struct CommitQueue {
    tx: mpsc::Sender<ProductRecord>,
}

impl CommitQueue {
    /// 入队一条商品记录
    pub async fn push(&self, record: ProductRecord) -> Result<(), QueueError> {
        self.tx.send(record).await.map_err(|_| QueueError::Closed)
    }
}

/// 提交队列接收端
///
/// 多个存储工作者共享同一接收端，各自取走下一条记录。
#[derive(Clone)]
pub struct CommitReceiver {
    rx: Arc<Mutex<mpsc::Receiver<ProductRecord>>>,
}

impl CommitReceiver {
    /// 取出下一条记录，队列关闭且排空后返回 None
    pub async fn recv(&self) -> Option<ProductRecord> {
        self.rx.lock().await.recv().await
    }
}

/// 创建指定容量的提交队列
pub fn bounded(capacity: usize) -> (CommitQueue, CommitReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        CommitQueue { tx },
        CommitReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}
