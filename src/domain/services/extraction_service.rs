use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::utils::text::{clean_text, parse_price, split_options};

/// 提取规则
///
/// 站点画像提供的选择器表。`name` 与 `price` 是必需字段，
/// 其余字段缺失时以空值填充。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRules {
    /// 商品名选择器，可用逗号分组
    pub name_selectors: String,
    /// 商品名兜底选择器
    pub name_fallback: Option<String>,
    /// 价格选择器
    pub price_selectors: String,
    /// 选项文本选择器，None 表示站点不提供选项
    pub options_selectors: Option<String>,
    /// 图片选择器
    pub image_selectors: String,
    /// 详情区选择器，未命中或为 None 时保留整页 HTML
    pub detail_selectors: Option<String>,
}

/// 提取错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// 必需字段未能提取
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// 规则中的选择器无法解析
    #[error("invalid selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
}

/// 提取出的商品字段，站点与时间元数据由调用方补充
#[derive(Debug, Clone)]
pub struct ExtractedFields {
    pub name: String,
    pub price: i64,
    pub options: Vec<String>,
    pub image_urls: Vec<String>,
    pub raw_detail: String,
}

/// 提取服务
///
/// 从详情页 HTML 中按规则提取结构化字段
pub struct ExtractionService;

impl ExtractionService {
    /// 提取商品字段
    ///
    /// # 参数
    /// * `html` - 详情页完整 HTML
    /// * `rules` - 站点提取规则
    /// * `base_url` - 相对图片地址的解析基准
    pub fn extract(
        html: &str,
        rules: &ExtractionRules,
        base_url: &Url,
    ) -> Result<ExtractedFields, ExtractionError> {
        let document = Html::parse_document(html);

        let mut name = Self::first_text(&document, &rules.name_selectors)?;
        if name.is_none() {
            if let Some(fallback) = &rules.name_fallback {
                name = Self::first_text(&document, fallback)?;
            }
        }
        let name = name.ok_or(ExtractionError::MissingField("name"))?;

        let price_text = Self::first_text(&document, &rules.price_selectors)?
            .ok_or(ExtractionError::MissingField("price"))?;
        let price = parse_price(&price_text).ok_or(ExtractionError::MissingField("price"))?;

        let options = match &rules.options_selectors {
            Some(selectors) => Self::first_text(&document, selectors)?
                .map(|text| split_options(&text))
                .unwrap_or_default(),
            None => Vec::new(),
        };

        let image_urls = Self::collect_image_urls(&document, &rules.image_selectors, base_url)?;
        let raw_detail = Self::detail_html(&document, rules.detail_selectors.as_deref(), html)?;

        Ok(ExtractedFields {
            name,
            price,
            options,
            image_urls,
            raw_detail,
        })
    }

    fn parse_selector(css: &str) -> Result<Selector, ExtractionError> {
        Selector::parse(css).map_err(|e| ExtractionError::InvalidSelector {
            selector: css.to_string(),
            message: e.to_string(),
        })
    }

    /// 第一个命中元素的清理后文本，空文本视为未命中
    fn first_text(document: &Html, css: &str) -> Result<Option<String>, ExtractionError> {
        let selector = Self::parse_selector(css)?;
        for element in document.select(&selector) {
            let text = clean_text(&element.text().collect::<Vec<_>>().join(" "));
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }

    /// 收集图片绝对地址，保持出现顺序并去重
    fn collect_image_urls(
        document: &Html,
        css: &str,
        base_url: &Url,
    ) -> Result<Vec<String>, ExtractionError> {
        const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];

        let selector = Self::parse_selector(css)?;
        let mut urls = Vec::new();
        for element in document.select(&selector) {
            let Some(src) = element.value().attr("src") else {
                continue;
            };
            if !IMAGE_EXTENSIONS.iter().any(|ext| src.contains(ext)) {
                continue;
            }
            let absolute = if src.starts_with("http") {
                src.to_string()
            } else {
                match base_url.join(src) {
                    Ok(url) => url.to_string(),
                    Err(_) => continue,
                }
            };
            if !urls.contains(&absolute) {
                urls.push(absolute);
            }
        }
        Ok(urls)
    }

    /// 详情区 HTML，选择器未命中时回退到整页
    fn detail_html(
        document: &Html,
        css: Option<&str>,
        full_html: &str,
    ) -> Result<String, ExtractionError> {
        if let Some(css) = css {
            let selector = Self::parse_selector(css)?;
            if let Some(element) = document.select(&selector).next() {
                return Ok(element.inner_html());
            }
        }
        Ok(full_html.to_string())
    }
}
