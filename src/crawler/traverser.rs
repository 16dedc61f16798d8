// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::crawler::cancel::CancelFlag;
use crate::crawler::fetcher::classify_engine_error;
use crate::crawler::session_pool::{SessionLease, SessionPool};
use crate::crawler::throttle::Throttle;
use crate::domain::models::scope::ScopeDescriptor;
use crate::domain::sites::profile::{Readiness, SiteProfile};
use crate::engines::traits::{PageEngine, PageRequest, PageSnapshot};
use crate::utils::errors::CrawlError;

/// 遍历器
///
/// 负责范围枚举与列表翻页。列表遍历持有一个会话租约，
/// 在详情派发开始之前归还，避免占用抓取并发。
pub struct Traverser {
    profile: Arc<dyn SiteProfile>,
    engine: Arc<dyn PageEngine>,
    pool: Arc<SessionPool>,
    throttle: Arc<Throttle>,
    request_timeout: Duration,
    default_item_cap: usize,
    cancel: CancelFlag,
}

impl Traverser {
    pub fn new(
        profile: Arc<dyn SiteProfile>,
        engine: Arc<dyn PageEngine>,
        pool: Arc<SessionPool>,
        throttle: Arc<Throttle>,
        request_timeout: Duration,
        default_item_cap: usize,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            profile,
            engine,
            pool,
            throttle,
            request_timeout,
            default_item_cap,
            cancel,
        }
    }

    /// 枚举遍历范围
    ///
    /// 配置的范围清单优先。清单为空且站点声明了发现入口时，
    /// 加载入口页并解析范围编号，顺序即后续处理顺序。
    pub async fn enumerate_scopes(
        &self,
        site: &str,
        configured: &[String],
    ) -> Result<Vec<ScopeDescriptor>, CrawlError> {
        if !configured.is_empty() {
            return Ok(configured
                .iter()
                .map(|id| ScopeDescriptor::new(id.clone(), self.default_item_cap))
                .collect());
        }

        let Some(url) = self.profile.discovery_url() else {
            return Ok(Vec::new());
        };

        let lease = self.pool.acquire(site).await?;
        let snapshot = self
            .load_page(&lease, url, Readiness::DocumentLoaded)
            .await?;
        drop(lease);

        let scope_ids = self.profile.parse_scope_ids(&snapshot.html);
        info!(count = scope_ids.len(), "discovered scopes from entry page");
        Ok(scope_ids
            .into_iter()
            .map(|id| ScopeDescriptor::new(id, self.default_item_cap))
            .collect())
    }

    /// 遍历范围的列表页，填充商品编号
    ///
    /// 翻页直到数量上限、页面不再带来新商品或列表耗尽。
    /// 已经填充过的范围（直接清单模式）原样返回。
    pub async fn list_items(
        &self,
        site: &str,
        scope: &mut ScopeDescriptor,
    ) -> Result<(), CrawlError> {
        if scope.is_full() {
            return Ok(());
        }

        let lease = self.pool.acquire(site).await?;
        let mut page = 1u32;

        loop {
            if self.cancel.is_cancelled() {
                return Err(CrawlError::Cancelled);
            }
            if page > 1 {
                self.throttle.between_items().await;
            }

            let url = self.profile.listing_url(&scope.scope_id, page);
            let snapshot = self
                .load_page(&lease, url, Readiness::DocumentLoaded)
                .await?;

            if let Some(marker) = self.profile.detect_block(&snapshot.html) {
                return Err(CrawlError::RateLimitSuspected(marker));
            }

            let page_ids = self.profile.parse_listing(&snapshot.html);
            if page_ids.is_empty() {
                debug!(scope_id = %scope.scope_id, page, "listing page empty, traversal ends");
                break;
            }

            let added = scope.absorb(&page_ids);
            debug!(
                scope_id = %scope.scope_id,
                page,
                added,
                total = scope.discovered_item_ids.len(),
                "listing page absorbed"
            );

            if added == 0 || scope.is_full() {
                break;
            }
            page += 1;
        }

        info!(
            scope_id = %scope.scope_id,
            discovered = scope.discovered_item_ids.len(),
            "scope listing complete"
        );
        Ok(())
    }

    /// 用租约身份加载一个页面，尊重取消信号
    async fn load_page(
        &self,
        lease: &SessionLease,
        url: String,
        readiness: Readiness,
    ) -> Result<PageSnapshot, CrawlError> {
        let request = PageRequest {
            url,
            user_agent: lease.identity().user_agent.clone(),
            viewport: lease.identity().viewport,
            readiness,
            timeout: self.request_timeout,
            context_id: lease.context_id(),
        };

        tokio::select! {
            result = self.engine.load(&request) => result.map_err(classify_engine_error),
            _ = self.cancel.cancelled() => Err(CrawlError::Cancelled),
        }
    }
}
