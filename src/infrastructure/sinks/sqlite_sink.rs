// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::Path;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::domain::models::product::ProductRecord;
use crate::domain::sinks::record_sink::{RecordSink, SinkError};

const CREATE_PRODUCTS_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        item_id TEXT NOT NULL,
        name TEXT NOT NULL,
        price INTEGER NOT NULL,
        options TEXT NOT NULL,
        image_urls TEXT NOT NULL,
        raw_detail TEXT NOT NULL,
        source_site TEXT NOT NULL,
        extracted_at TEXT NOT NULL,
        PRIMARY KEY (source_site, item_id)
    )
"#;

/// SQLite 落地实现
///
/// 以 (source_site, item_id) 为主键做 UPSERT,重复提交只刷新字段。
pub struct SqliteSink {
    pool: SqlitePool,
}

impl SqliteSink {
    pub async fn connect(database_url: &str) -> Result<Self, SinkError> {
        let db_path = database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");

        // 连接前确保数据库文件存在,sqlx 默认不会自动创建
        if db_path != ":memory:" && !Path::new(db_path).exists() {
            if let Some(parent) = Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            tokio::fs::File::create(db_path).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::query(CREATE_PRODUCTS_SQL).execute(&pool).await?;
        info!(database_url = %database_url, "SQLite sink ready");

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl RecordSink for SqliteSink {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn commit(&self, record: &ProductRecord) -> Result<(), SinkError> {
        let options = serde_json::to_string(&record.options)?;
        let image_urls = serde_json::to_string(&record.image_urls)?;

        sqlx::query(
            r#"
            INSERT INTO products (
                item_id, name, price, options, image_urls,
                raw_detail, source_site, extracted_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (source_site, item_id) DO UPDATE SET
                name = excluded.name,
                price = excluded.price,
                options = excluded.options,
                image_urls = excluded.image_urls,
                raw_detail = excluded.raw_detail,
                extracted_at = excluded.extracted_at
            "#,
        )
        .bind(&record.item_id)
        .bind(&record.name)
        .bind(record.price)
        .bind(&options)
        .bind(&image_urls)
        .bind(&record.raw_detail)
        .bind(&record.source_site)
        .bind(record.extracted_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn stored_ids(&self, site: &str) -> Result<Vec<String>, SinkError> {
        let rows = sqlx::query("SELECT item_id FROM products WHERE source_site = ?")
            .bind(site)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("item_id")).collect())
    }
}
