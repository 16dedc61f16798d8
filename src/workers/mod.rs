// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 存储工作者模块
///
/// 从提交队列消费商品记录并写入全部存储端
pub mod commit_worker;
pub mod manager;

pub use commit_worker::CommitWorker;
pub use manager::StorageCoordinator;
