// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;
use tracing::debug;
use uuid::Uuid;

use crate::crawler::identity::SessionIdentity;
use crate::utils::errors::CrawlError;

/// 持久会话上下文
///
/// 要求状态延续的站点在整个运行期间复用同一份身份与上下文编号，
/// 引擎据此保留 Cookie 等会话状态。
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub id: Uuid,
    pub identity: SessionIdentity,
    pub created_at: DateTime<Utc>,
}

/// 会话租约
///
/// 持有期间占用站点的一个并发槽。归还由 Drop 完成，成功、失败、
/// 取消任何一条退出路径都恰好释放一次，不存在泄漏或重复释放。
#[derive(Debug)]
pub struct SessionLease {
    site: String,
    identity: SessionIdentity,
    context: Option<Arc<SessionContext>>,
    acquired_at: Instant,
    _permit: OwnedSemaphorePermit,
}

impl SessionLease {
    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    /// 持久上下文编号，无状态租约为 None
    pub fn context_id(&self) -> Option<Uuid> {
        self.context.as_ref().map(|context| context.id)
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        debug!(
            site = %self.site,
            held_ms = self.acquired_at.elapsed().as_millis() as u64,
            "session lease released"
        );
    }
}

struct SiteSlots {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    acquire_timeout: Duration,
    persistent: bool,
}

/// 会话池
///
/// 按站点维护固定数量的会话槽。槽满时申请方挂起排队，
/// 超过配置时限未得到槽即失败。
pub struct SessionPool {
    sites: DashMap<String, SiteSlots>,
    contexts: DashMap<String, Arc<SessionContext>>,
}

impl SessionPool {
    pub fn new() -> Self {
        Self {
            sites: DashMap::new(),
            contexts: DashMap::new(),
        }
    }

    /// 注册站点并设定并发上限
    ///
    /// # 参数
    /// * `capacity` - 并发会话上限
    /// * `acquire_timeout` - 租约申请的最长等待
    /// * `persistent` - 是否让全部租约共享一个持久上下文
    pub fn register_site(
        &self,
        site: &str,
        capacity: usize,
        acquire_timeout: Duration,
        persistent: bool,
    ) {
        self.sites.insert(
            site.to_string(),
            SiteSlots {
                semaphore: Arc::new(Semaphore::new(capacity)),
                capacity,
                acquire_timeout,
                persistent,
            },
        );
    }

    /// 获取一个会话租约
    ///
    /// 无空闲槽时挂起等待，超过站点配置的时限返回
    /// `PoolExhaustionTimeout`。
    pub async fn acquire(&self, site: &str) -> Result<SessionLease, CrawlError> {
        let (semaphore, acquire_timeout, persistent) = {
            let slots = self
                .sites
                .get(site)
                .ok_or_else(|| CrawlError::LoadFailure(format!("site not registered: {}", site)))?;
            (
                slots.semaphore.clone(),
                slots.acquire_timeout,
                slots.persistent,
            )
        };

        let permit = match timeout(acquire_timeout, semaphore.acquire_owned()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => {
                return Err(CrawlError::LoadFailure("session pool closed".to_string()));
            }
            Err(_) => {
                return Err(CrawlError::PoolExhaustionTimeout(
                    acquire_timeout.as_millis() as u64,
                ));
            }
        };

        let (identity, context) = if persistent {
            let context = self
                .contexts
                .entry(site.to_string())
                .or_insert_with(|| {
                    Arc::new(SessionContext {
                        id: Uuid::new_v4(),
                        identity: SessionIdentity::random(),
                        created_at: Utc::now(),
                    })
                })
                .clone();
            (context.identity.clone(), Some(context))
        } else {
            (SessionIdentity::random(), None)
        };

        debug!(site, "session lease acquired");
        Ok(SessionLease {
            site: site.to_string(),
            identity,
            context,
            acquired_at: Instant::now(),
            _permit: permit,
        })
    }

    /// 站点当前被占用的槽数
    pub fn outstanding(&self, site: &str) -> usize {
        self.sites
            .get(site)
            .map(|slots| slots.capacity - slots.semaphore.available_permits())
            .unwrap_or(0)
    }

    /// 站点的并发上限，未注册返回 0
    pub fn capacity(&self, site: &str) -> usize {
        self.sites.get(site).map(|slots| slots.capacity).unwrap_or(0)
    }
}

impl Default for SessionPool {
    fn default() -> Self {
        Self::new()
    }
}
