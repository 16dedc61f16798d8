// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 落地实现模块
///
/// 提供 JSONL、CSV、SQLite 三种持久化后端及其工厂函数。
pub mod csv_sink;
pub mod jsonl_sink;
pub mod sqlite_sink;

use std::sync::Arc;

use crate::config::settings::StorageSettings;
use crate::domain::sinks::record_sink::{RecordSink, SinkError};

pub use csv_sink::CsvSink;
pub use jsonl_sink::JsonlSink;
pub use sqlite_sink::SqliteSink;

/// 落地工厂函数
///
/// 按配置顺序实例化落地后端,未知名称视为配置错误。
pub async fn create_sinks(
    settings: &StorageSettings,
) -> Result<Vec<Arc<dyn RecordSink>>, SinkError> {
    let mut sinks: Vec<Arc<dyn RecordSink>> = Vec::new();
    for name in &settings.sinks {
        match name.as_str() {
            "jsonl" => sinks.push(Arc::new(JsonlSink::new(&settings.jsonl_path))),
            "csv" => sinks.push(Arc::new(CsvSink::new(&settings.csv_path))),
            "sqlite" => sinks.push(Arc::new(SqliteSink::connect(&settings.database_url).await?)),
            other => {
                return Err(SinkError::Unavailable(format!(
                    "Unsupported sink type: {}",
                    other
                )))
            }
        }
    }
    Ok(sinks)
}
