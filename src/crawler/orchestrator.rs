// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::settings::{RunSettings, SiteSettings, StorageSettings};
use crate::crawler::cancel::CancelFlag;
use crate::crawler::dedup::Deduplicator;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::session_pool::SessionPool;
use crate::crawler::stats::RunStats;
use crate::crawler::throttle::Throttle;
use crate::crawler::traverser::Traverser;
use crate::domain::models::failure::FailureRecord;
use crate::domain::models::scope::ScopeDescriptor;
use crate::domain::models::summary::RunSummary;
use crate::domain::models::work_item::WorkItem;
use crate::domain::sinks::record_sink::RecordSink;
use crate::domain::sites::profile::SiteProfile;
use crate::engines::traits::PageEngine;
use crate::infrastructure::reporter::FailureReporter;
use crate::utils::errors::CrawlError;
use crate::utils::retry_policy::RetryPolicy;
use crate::workers::manager::StorageCoordinator;

/// 爬取编排器
///
/// 驱动一次完整运行：范围枚举、列表遍历、去重过滤、带重试的
/// 详情抓取、提交入队与收尾汇总。范围严格按发现顺序处理，
/// 范围内商品按列表顺序派发。
pub struct CrawlOrchestrator {
    run_id: Uuid,
    site: String,
    run: RunSettings,
    site_settings: SiteSettings,
    profile: Arc<dyn SiteProfile>,
    pool: Arc<SessionPool>,
    throttle: Arc<Throttle>,
    fetcher: Arc<Fetcher>,
    traverser: Traverser,
    coordinator: StorageCoordinator,
    sinks: Vec<Arc<dyn RecordSink>>,
    reporter: Arc<FailureReporter>,
    stats: Arc<RunStats>,
    cancel: CancelFlag,
}

impl CrawlOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        run_id: Uuid,
        site: String,
        run: RunSettings,
        site_settings: SiteSettings,
        storage: &StorageSettings,
        base_url: Url,
        profile: Arc<dyn SiteProfile>,
        engine: Arc<dyn PageEngine>,
        sinks: Vec<Arc<dyn RecordSink>>,
        reporter: Arc<FailureReporter>,
        cancel: CancelFlag,
    ) -> Self {
        let pool = Arc::new(SessionPool::new());
        pool.register_site(
            &site,
            site_settings.max_concurrent_sessions,
            Duration::from_millis(site_settings.acquire_timeout_ms),
            site_settings.persistent_context,
        );

        let throttle = Arc::new(Throttle::new(
            (site_settings.min_delay_ms, site_settings.max_delay_ms),
            (
                site_settings.inter_scope_delay_min_ms,
                site_settings.inter_scope_delay_max_ms,
            ),
        ));

        let request_timeout = Duration::from_secs(site_settings.request_timeout_secs);
        let policy = RetryPolicy::new(
            site_settings.max_retries,
            Duration::from_millis(site_settings.retry_delay_ms),
        );

        let stats = Arc::new(RunStats::new());
        let fetcher = Arc::new(Fetcher::new(
            engine.clone(),
            profile.clone(),
            policy,
            request_timeout,
            base_url,
            cancel.clone(),
        ));
        let traverser = Traverser::new(
            profile.clone(),
            engine,
            pool.clone(),
            throttle.clone(),
            request_timeout,
            site_settings.item_cap_per_scope,
            cancel.clone(),
        );
        let coordinator = StorageCoordinator::start(
            sinks.clone(),
            reporter.clone(),
            stats.clone(),
            storage.queue_capacity,
            storage.commit_workers,
        );

        Self {
            run_id,
            site,
            run,
            site_settings,
            profile,
            pool,
            throttle,
            fetcher,
            traverser,
            coordinator,
            sinks,
            reporter,
            stats,
            cancel,
        }
    }

    /// 执行运行直至完成、预算耗尽或被取消
    ///
    /// 返回前排空提交队列，摘要因此包含全部存储结果。
    pub async fn run(self) -> Result<RunSummary, CrawlError> {
        info!(run_id = %self.run_id, site = %self.site, "crawl run starting");

        let dedup = self.build_dedup().await;
        let mut scopes = self.enumerate().await?;
        if scopes.is_empty() {
            warn!("no scopes to traverse, nothing to do");
        } else {
            info!(scopes = scopes.len(), "scope enumeration complete");
        }

        let deadline = self
            .run
            .time_budget_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        let budget = self.run.max_items;
        let mut dispatched_total = 0usize;
        let mut seen_this_run: HashSet<String> = HashSet::new();

        for (index, scope) in scopes.iter_mut().enumerate() {
            if self.cancel.is_cancelled() {
                info!("run cancelled, stopping scope traversal");
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                info!("time budget exhausted, stopping scope traversal");
                break;
            }
            if budget.is_some_and(|b| dispatched_total >= b) {
                info!(budget = budget.unwrap_or(0), "global item budget reached");
                break;
            }

            if index > 0 {
                self.throttle.between_scopes().await;
            }

            match self.traverser.list_items(&self.site, scope).await {
                Ok(()) => {}
                Err(CrawlError::Cancelled) => break,
                Err(error) => {
                    warn!(
                        scope_id = %scope.scope_id,
                        error = %error,
                        "scope listing failed, skipping scope"
                    );
                    self.stats.record_skipped_scope(&scope.scope_id);
                    continue;
                }
            }

            let (fresh, skipped) = dedup.filter_new(&scope.discovered_item_ids);
            if skipped > 0 {
                info!(
                    scope_id = %scope.scope_id,
                    skipped,
                    "skipped previously harvested items"
                );
                self.stats.record_duplicates(&scope.scope_id, skipped as u64);
            }

            self.process_scope(
                scope,
                &fresh,
                &mut dispatched_total,
                budget,
                deadline,
                &mut seen_this_run,
            )
            .await;
        }

        // 收尾：先排空提交队列，再生成摘要
        self.coordinator.shutdown().await;
        let summary = self
            .stats
            .snapshot(self.run_id, &self.site, self.reporter.log_path());
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped_duplicates = summary.skipped_duplicates,
            sink_failures = summary.sink_failures,
            elapsed_ms = summary.elapsed_ms,
            "crawl run finished"
        );
        Ok(summary)
    }

    /// 装载既有编号集合
    ///
    /// 增量模式下合并参考数据集与各存储端的既有编号，
    /// 任一来源不可用时告警并继续。
    async fn build_dedup(&self) -> Deduplicator {
        if !self.run.new_items_only {
            return Deduplicator::new();
        }

        let mut known: HashSet<String> = HashSet::new();
        if let Some(path) = &self.run.reference_dataset {
            match Deduplicator::load_reference(Path::new(path), self.profile.id_field_name()).await
            {
                Ok(ids) => {
                    info!(count = ids.len(), path = %path, "loaded reference dataset");
                    known.extend(ids);
                }
                Err(error) => {
                    warn!(path = %path, %error, "reference dataset unavailable, continuing without it");
                }
            }
        }
        for sink in &self.sinks {
            match sink.stored_ids(&self.site).await {
                Ok(ids) => known.extend(ids),
                Err(error) => {
                    warn!(sink = sink.name(), %error, "stored id query failed");
                }
            }
        }
        info!(known = known.len(), "dedup set ready");
        Deduplicator::with_known(known)
    }

    /// 构造范围清单，直接清单模式优先于站点遍历
    async fn enumerate(&self) -> Result<Vec<ScopeDescriptor>, CrawlError> {
        if !self.run.item_ids.is_empty() {
            return Ok(vec![ScopeDescriptor::with_items(
                "direct",
                self.run.item_ids.clone(),
            )]);
        }
        self.traverser
            .enumerate_scopes(&self.site, &self.site_settings.scope_ids)
            .await
    }

    /// 派发一个范围内的全部新商品并等待完成
    ///
    /// 每次派发前等待节流间隔、申请会话租约；连续失败达到阈值时
    /// 放弃范围剩余部分。范围边界处排空在途任务，保证顺序语义。
    async fn process_scope(
        &self,
        scope: &ScopeDescriptor,
        fresh: &[String],
        dispatched_total: &mut usize,
        budget: Option<usize>,
        deadline: Option<Instant>,
        seen_this_run: &mut HashSet<String>,
    ) {
        let threshold = self.site_settings.consecutive_failure_threshold;
        let consecutive_failures = Arc::new(AtomicU32::new(0));
        let mut in_flight = FuturesUnordered::new();

        for item_id in fresh {
            if self.cancel.is_cancelled() {
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
            if budget.is_some_and(|b| *dispatched_total >= b) {
                break;
            }
            if threshold > 0 && consecutive_failures.load(Ordering::Relaxed) >= threshold {
                warn!(
                    scope_id = %scope.scope_id,
                    threshold,
                    "consecutive failure threshold reached, skipping rest of scope"
                );
                self.stats.record_skipped_scope(&scope.scope_id);
                break;
            }
            if !seen_this_run.insert(item_id.clone()) {
                debug!(item_id = %item_id, "already dispatched in this run");
                continue;
            }

            self.throttle.between_items().await;

            let mut item = WorkItem::new(self.site.clone(), scope.scope_id.clone(), item_id.clone());
            *dispatched_total += 1;

            let lease = match self.pool.acquire(&self.site).await {
                Ok(lease) => lease,
                Err(error) => {
                    consecutive_failures.fetch_add(1, Ordering::Relaxed);
                    self.stats.record_failure(&scope.scope_id);
                    if let Some(record) = FailureRecord::from_error(&item, &error) {
                        self.reporter.report(&record).await;
                    }
                    continue;
                }
            };

            let fetcher = self.fetcher.clone();
            let queue = self.coordinator.queue();
            let reporter = self.reporter.clone();
            let stats = self.stats.clone();
            let consec = consecutive_failures.clone();
            let scope_id = scope.scope_id.clone();

            in_flight.push(tokio::spawn(async move {
                let outcome = fetcher.fetch(&mut item, &lease).await;
                drop(lease);

                match outcome {
                    Ok(record) => {
                        consec.store(0, Ordering::Relaxed);
                        stats.record_success(&scope_id);
                        if let Err(error) = queue.push(record).await {
                            warn!(%error, "commit queue rejected record");
                            stats.record_sink_failure();
                        }
                    }
                    Err(CrawlError::Cancelled) => {
                        debug!(item_id = %item.item_id, "fetch cancelled");
                    }
                    Err(error) => {
                        consec.fetch_add(1, Ordering::Relaxed);
                        stats.record_failure(&scope_id);
                        if let Some(record) = FailureRecord::from_error(&item, &error) {
                            reporter.report(&record).await;
                        }
                    }
                }
            }));
        }

        // 范围边界：等待在途抓取全部结束
        while let Some(joined) = in_flight.next().await {
            if let Err(join_error) = joined {
                error!(%join_error, "fetch task panicked");
            }
        }
    }
}
