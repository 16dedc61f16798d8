// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use url::Url;

use crate::crawler::cancel::CancelFlag;
use crate::crawler::session_pool::SessionLease;
use crate::domain::models::product::ProductRecord;
use crate::domain::models::work_item::WorkItem;
use crate::domain::services::extraction_service::{ExtractionError, ExtractionService};
use crate::domain::sites::profile::SiteProfile;
use crate::engines::traits::{EngineError, PageEngine, PageRequest};
use crate::utils::errors::CrawlError;
use crate::utils::retry_policy::RetryPolicy;

/// 引擎错误到爬取错误的归类
pub(crate) fn classify_engine_error(error: EngineError) -> CrawlError {
    match error {
        EngineError::RequestFailed(e) => CrawlError::LoadFailure(e.to_string()),
        EngineError::Navigation(message) => CrawlError::LoadFailure(message),
        EngineError::Timeout => CrawlError::LoadFailure("page load timeout".to_string()),
        EngineError::ReadinessTimeout(condition) => CrawlError::ReadinessTimeout(condition),
        EngineError::BlockedStatus(status) => {
            CrawlError::RateLimitSuspected(format!("blocked status {}", status))
        }
        EngineError::Other(message) => CrawlError::LoadFailure(message),
    }
}

/// 抓取器
///
/// 借用会话租约完成单个商品的加载、封禁检测与字段提取，
/// 失败按策略重试。租约的释放始终由调用方作用域负责。
pub struct Fetcher {
    engine: Arc<dyn PageEngine>,
    profile: Arc<dyn SiteProfile>,
    policy: RetryPolicy,
    request_timeout: Duration,
    base_url: Url,
    cancel: CancelFlag,
}

impl Fetcher {
    pub fn new(
        engine: Arc<dyn PageEngine>,
        profile: Arc<dyn SiteProfile>,
        policy: RetryPolicy,
        request_timeout: Duration,
        base_url: Url,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            engine,
            profile,
            policy,
            request_timeout,
            base_url,
            cancel,
        }
    }

    /// 抓取单个商品
    ///
    /// 每次重试前递增工作单元的尝试计数并按策略等待。
    /// 返回错误即该工作单元的终态，总尝试次数不超过
    /// `max_retries + 1`。
    pub async fn fetch(
        &self,
        item: &mut WorkItem,
        lease: &SessionLease,
    ) -> Result<ProductRecord, CrawlError> {
        let mut last_error = CrawlError::LoadFailure("no attempt made".to_string());

        for attempt in 0..=self.policy.max_retries {
            if self.cancel.is_cancelled() {
                return Err(CrawlError::Cancelled);
            }

            match self.attempt(item, lease).await {
                Ok(record) => {
                    if attempt > 0 {
                        info!(
                            item_id = %item.item_id,
                            attempt,
                            "fetch recovered after retry"
                        );
                    }
                    return Ok(record);
                }
                Err(CrawlError::Cancelled) => return Err(CrawlError::Cancelled),
                Err(error) => {
                    if self.policy.should_retry(&error, attempt) {
                        let delay = self.policy.delay_for(&error, attempt);
                        warn!(
                            item_id = %item.item_id,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %error,
                            "fetch attempt failed, will retry"
                        );
                        item.mark_retry();
                        tokio::time::sleep(delay).await;
                        last_error = error;
                    } else {
                        return Err(error);
                    }
                }
            }
        }

        Err(last_error)
    }

    /// 单次尝试：加载、封禁检测、字段提取
    async fn attempt(
        &self,
        item: &WorkItem,
        lease: &SessionLease,
    ) -> Result<ProductRecord, CrawlError> {
        let request = PageRequest {
            url: self.profile.detail_url(&item.item_id),
            user_agent: lease.identity().user_agent.clone(),
            viewport: lease.identity().viewport,
            readiness: self.profile.detail_readiness(),
            timeout: self.request_timeout,
            context_id: lease.context_id(),
        };

        let snapshot = tokio::select! {
            result = self.engine.load(&request) => result.map_err(classify_engine_error)?,
            _ = self.cancel.cancelled() => return Err(CrawlError::Cancelled),
        };

        if let Some(marker) = self.profile.detect_block(&snapshot.html) {
            return Err(CrawlError::RateLimitSuspected(marker));
        }

        let fields = ExtractionService::extract(
            &snapshot.html,
            self.profile.extraction_rules(),
            &self.base_url,
        )
        .map_err(|error| match error {
            ExtractionError::MissingField(field) => {
                CrawlError::ExtractionIncomplete(field.to_string())
            }
            other => CrawlError::ExtractionIncomplete(other.to_string()),
        })?;

        Ok(ProductRecord::new(
            item.site.clone(),
            item.item_id.clone(),
            fields.name,
            fields.price,
            fields.options,
            fields.image_urls,
            fields.raw_detail,
        ))
    }
}
