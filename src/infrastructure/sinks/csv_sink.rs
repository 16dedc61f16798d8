// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::PathBuf;

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::models::product::ProductRecord;
use crate::domain::sinks::record_sink::{RecordSink, SinkError};

const HEADER: &str = "item_id,name,price,options,image_urls,raw_detail,source_site,extracted_at";

/// CSV 落地实现
///
/// 列表类字段以 JSON 字符串写入单元格,与下游表格工具兼容。
pub struct CsvSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// RFC 4180 转义,包含分隔符或引号的字段整体加引号
    fn escape_field(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
        {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }

    fn format_row(record: &ProductRecord) -> Result<String, SinkError> {
        let options = serde_json::to_string(&record.options)?;
        let image_urls = serde_json::to_string(&record.image_urls)?;

        let fields = [
            Self::escape_field(&record.item_id),
            Self::escape_field(&record.name),
            record.price.to_string(),
            Self::escape_field(&options),
            Self::escape_field(&image_urls),
            Self::escape_field(&record.raw_detail),
            Self::escape_field(&record.source_site),
            record.extracted_at.to_rfc3339(),
        ];
        Ok(fields.join(","))
    }
}

#[async_trait::async_trait]
impl RecordSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn commit(&self, record: &ProductRecord) -> Result<(), SinkError> {
        let row = Self::format_row(record)?;

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let needs_header = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(SinkError::Io(e)),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        if needs_header {
            file.write_all(HEADER.as_bytes()).await?;
            file.write_all(b"\n").await?;
        }
        file.write_all(row.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;

        Ok(())
    }
}
