// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::product::ProductRecord;

/// 存储端错误
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("sink database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// 存储端
///
/// 接收商品记录并持久化。声明唯一键的实现必须按
/// `(source_site, item_id)` 覆盖写入，重复提交收敛到同一行；
/// 追加型实现没有这一约束。
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// 存储端名称，用于日志与失败归因
    fn name(&self) -> &'static str;

    /// 提交一条商品记录
    async fn commit(&self, record: &ProductRecord) -> Result<(), SinkError>;

    /// 列出某站点已存储的商品编号
    ///
    /// 用于增量模式的既有数据集。不支持查询的实现返回空集。
    async fn stored_ids(&self, site: &str) -> Result<Vec<String>, SinkError> {
        let _ = site;
        Ok(Vec::new())
    }
}

#[async_trait]
impl<T: RecordSink + ?Sized> RecordSink for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn commit(&self, record: &ProductRecord) -> Result<(), SinkError> {
        (**self).commit(record).await
    }

    async fn stored_ids(&self, site: &str) -> Result<Vec<String>, SinkError> {
        (**self).stored_ids(site).await
    }
}
