use regex::Regex;
use scraper::{Html, Selector};

use crate::domain::services::extraction_service::ExtractionRules;
use crate::domain::sites::profile::{Readiness, SiteProfile};

/// Oliveyoung 站点画像
///
/// 类目编号从主页的 `dispCatNo` 链接发现,列表接口按 `pageIdx` 翻页。
/// 站点会把被限流的会话重定向到登录页,命中 `.loginArea` 即判定封锁。
pub struct OliveyoungProfile {
    base_url: String,
    category_pattern: Regex,
    goods_pattern: Regex,
    goods_link_selector: Selector,
    no_product_selector: Selector,
    login_selector: Selector,
    error_selector: Selector,
    rules: ExtractionRules,
}

impl OliveyoungProfile {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            category_pattern: Regex::new(r"dispCatNo=(\d+)")
                .expect("Failed to compile dispCatNo pattern"),
            goods_pattern: Regex::new(r"goodsNo=([A-Z0-9]+)")
                .expect("Failed to compile goodsNo pattern"),
            goods_link_selector: Selector::parse(r#"a[href*="goodsNo="]"#)
                .expect("Failed to compile goods link selector"),
            no_product_selector: Selector::parse("#error-contents.error-page.noProduct")
                .expect("Failed to compile no-product selector"),
            login_selector: Selector::parse(".loginArea")
                .expect("Failed to compile login page selector"),
            error_selector: Selector::parse("#error-contents")
                .expect("Failed to compile error page selector"),
            rules: ExtractionRules {
                name_selectors: ".prd_name".to_string(),
                name_fallback: None,
                price_selectors: ".price-2 strong, .price-1 strike".to_string(),
                // 选项需要页面交互展开,静态快照拿不到
                options_selectors: None,
                image_selectors: ".prd_thumb_list img".to_string(),
                detail_selectors: None,
            },
        }
    }
}

impl SiteProfile for OliveyoungProfile {
    fn name(&self) -> &'static str {
        "oliveyoung"
    }

    fn id_field_name(&self) -> &'static str {
        "goods_no"
    }

    fn discovery_url(&self) -> Option<String> {
        Some(format!("{}/store/main/main.do", self.base_url))
    }

    fn parse_scope_ids(&self, html: &str) -> Vec<String> {
        let mut ids = Vec::new();
        for captures in self.category_pattern.captures_iter(html) {
            let id = captures[1].to_string();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    fn listing_url(&self, scope_id: &str, page: u32) -> String {
        format!(
            "{}/store/display/getMCategoryList.do?dispCatNo={}&prdSort=02&rowsPerPage=48&pageIdx={}",
            self.base_url, scope_id, page
        )
    }

    fn parse_listing(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut ids = Vec::new();
        for link in document.select(&self.goods_link_selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if let Some(captures) = self.goods_pattern.captures(href) {
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
            "{}/store/goods/getGoodsDetail.do?goodsNo={}",
            self.base_url, item_id
        )
    }

    fn detail_readiness(&self) -> Readiness {
        Readiness::Selector(".prd_name".to_string())
    }

    fn detect_block(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        // 下架商品也会渲染 #error-contents,先排除再判断封锁
        if document.select(&self.no_product_selector).next().is_some() {
            return None;
        }
        if document.select(&self.login_selector).next().is_some() {
            return Some("redirected to login page".to_string());
        }
        if document.select(&self.error_selector).next().is_some() {
            return Some("error page returned".to_string());
        }
        None
    }

    fn extraction_rules(&self) -> &ExtractionRules {
        &self.rules
    }
}
