// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 商品记录
///
/// 一次成功抓取产出的完整商品数据。记录创建后不可变，
/// 同一 `(source_site, item_id)` 的新记录整体替换旧记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// 站点内商品编号
    pub item_id: String,
    /// 商品名称，必需字段
    pub name: String,
    /// 以最小货币单位表示的价格，必需字段
    pub price: i64,
    /// 购买选项文本，可为空
    pub options: Vec<String>,
    /// 商品图片绝对地址，按出现顺序去重
    pub image_urls: Vec<String>,
    /// 详情区原始 HTML，不做解析
    pub raw_detail: String,
    /// 来源站点标识
    pub source_site: String,
    /// 提取完成时间
    pub extracted_at: DateTime<Utc>,
}

impl ProductRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_site: impl Into<String>,
        item_id: impl Into<String>,
        name: impl Into<String>,
        price: i64,
        options: Vec<String>,
        image_urls: Vec<String>,
        raw_detail: String,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            price,
            options,
            image_urls,
            raw_detail,
            source_site: source_site.into(),
            extracted_at: Utc::now(),
        }
    }
}
