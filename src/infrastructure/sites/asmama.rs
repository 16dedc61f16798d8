// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use regex::Regex;
use scraper::{Html, Selector};

use crate::domain::services::extraction_service::ExtractionRules;
use crate::domain::sites::profile::{Readiness, SiteProfile};

/// Asmama 站点画像
///
/// 饰品商城，无动态范围发现，遍历范围来自配置的类目编号。
/// 详情页地址形如 `shop/shopdetail.html?branduid={id}`，
/// 列表页通过 `page` 参数翻页。
pub struct AsmamaProfile {
    base_url: String,
    link_selector: Selector,
    id_pattern: Regex,
    rules: ExtractionRules,
}

impl AsmamaProfile {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            link_selector: Selector::parse(r#"a[href*="branduid="]"#)
                .expect("Failed to compile product link selector"),
            id_pattern: Regex::new(r"branduid=(\d+)").expect("Failed to compile branduid pattern"),
            rules: ExtractionRules {
                name_selectors: "h1, .product-title, .item-name, .product-name".to_string(),
                name_fallback: Some("title".to_string()),
                price_selectors: ".price, .product-price, .item-price, .cost".to_string(),
                options_selectors: Some(".options, .product-options, .item-options".to_string()),
                image_selectors: "img".to_string(),
                detail_selectors: Some(".product-detail, .item-detail, .description".to_string()),
            },
        }
    }
}

impl SiteProfile for AsmamaProfile {
    fn name(&self) -> &'static str {
        "asmama"
    }

    fn id_field_name(&self) -> &'static str {
        "branduid"
    }

    fn discovery_url(&self) -> Option<String> {
        None
    }

    fn parse_scope_ids(&self, _html: &str) -> Vec<String> {
        Vec::new()
    }

    fn listing_url(&self, scope_id: &str, page: u32) -> String {
        format!(
            "{}/shop/shopbrand.html?xcode={}&type=X&page={}",
            self.base_url, scope_id, page
        )
    }

    fn parse_listing(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut ids = Vec::new();
        for link in document.select(&self.link_selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if let Some(captures) = self.id_pattern.captures(href) {
                let id = captures[1].to_string();
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    fn detail_url(&self, item_id: &str) -> String {
        format!(
            "{}/shop/shopdetail.html?branduid={}",
            self.base_url, item_id
        )
    }

    fn detail_readiness(&self) -> Readiness {
        // 详情页模板多变,加载完成即视为就绪,字段缺失由提取阶段判定
        Readiness::DocumentLoaded
    }

    fn detect_block(&self, _html: &str) -> Option<String> {
        None
    }

    fn extraction_rules(&self) -> &ExtractionRules {
        &self.rules
    }
}
