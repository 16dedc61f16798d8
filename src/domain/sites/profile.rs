// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::extraction_service::ExtractionRules;

/// 页面就绪条件
///
/// 引擎在导航完成后按此条件判断页面是否可用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// 等待指定 CSS 选择器命中
    Selector(String),
    /// 等待响应体包含指定文本
    Marker(String),
    /// 仅等待文档加载完成
    DocumentLoaded,
}

/// 站点画像
///
/// 封装单个站点的全部专属知识：URL 构造、列表与范围解析、
/// 就绪条件、封禁判定与字段提取规则。实现必须是纯函数式的，
/// 页面加载由引擎负责。
pub trait SiteProfile: Send + Sync {
    /// 站点标识，与配置键一致
    fn name(&self) -> &'static str;

    /// 失败日志中商品编号的字段名
    fn id_field_name(&self) -> &'static str;

    /// 范围发现入口页，返回 None 的站点只使用配置中的范围清单
    fn discovery_url(&self) -> Option<String>;

    /// 从发现页提取范围编号，按文档顺序去重
    fn parse_scope_ids(&self, html: &str) -> Vec<String>;

    /// 构造列表页 URL，`page` 从 1 开始
    fn listing_url(&self, scope_id: &str, page: u32) -> String;

    /// 从列表页提取商品编号，保持出现顺序并去重
    fn parse_listing(&self, html: &str) -> Vec<String>;

    /// 构造详情页 URL
    fn detail_url(&self, item_id: &str) -> String;

    /// 详情页就绪条件
    fn detail_readiness(&self) -> Readiness;

    /// 判定页面是否为封禁或错误页
    ///
    /// # 返回值
    /// 命中的标记描述，未命中返回 None
    fn detect_block(&self, html: &str) -> Option<String>;

    /// 详情页字段提取规则
    fn extraction_rules(&self) -> &ExtractionRules;
}
