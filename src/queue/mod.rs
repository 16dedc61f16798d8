// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 提交队列模块
///
/// 抓取任务与存储工作者之间的有界缓冲
pub mod commit_queue;

pub use commit_queue::{CommitQueue, CommitReceiver, QueueError};
