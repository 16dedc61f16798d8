// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod mock_engine;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use harvestrs::config::settings::{RunSettings, SiteSettings, StorageSettings};
use harvestrs::crawler::cancel::CancelFlag;
use harvestrs::crawler::orchestrator::CrawlOrchestrator;
use harvestrs::domain::models::product::ProductRecord;
use harvestrs::domain::services::extraction_service::ExtractionRules;
use harvestrs::domain::sinks::record_sink::{RecordSink, SinkError};
use harvestrs::domain::sites::profile::{Readiness, SiteProfile};
use harvestrs::infrastructure::reporter::FailureReporter;
use regex::Regex;
use url::Url;
use uuid::Uuid;

pub use mock_engine::ScriptedEngine;

pub const BASE: &str = "http://shop.test";

/// Minimal site profile for a fictional shop, paired with ScriptedEngine.
pub struct TestProfile {
    scope_pattern: Regex,
    item_pattern: Regex,
    rules: ExtractionRules,
}

impl TestProfile {
    pub fn new() -> Self {
        Self {
            scope_pattern: Regex::new(r"scope=([A-Za-z0-9_]+)").unwrap(),
            item_pattern: Regex::new(r"item_no=(\d+)").unwrap(),
            rules: ExtractionRules {
                name_selectors: ".name".to_string(),
                name_fallback: None,
                price_selectors: ".price".to_string(),
                options_selectors: Some(".options".to_string()),
                image_selectors: "img".to_string(),
                detail_selectors: Some(".detail".to_string()),
            },
        }
    }
}

impl Default for TestProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteProfile for TestProfile {
    fn name(&self) -> &'static str {
        "testshop"
    }

    fn id_field_name(&self) -> &'static str {
        "item_no"
    }

    fn discovery_url(&self) -> Option<String> {
        Some(format!("{}/main", BASE))
    }

    fn parse_scope_ids(&self, html: &str) -> Vec<String> {
        let mut ids = Vec::new();
        for captures in self.scope_pattern.captures_iter(html) {
            let id = captures[1].to_string();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    fn listing_url(&self, scope_id: &str, page: u32) -> String {
        format!("{}/list/{}?page={}", BASE, scope_id, page)
    }

    fn parse_listing(&self, html: &str) -> Vec<String> {
        let mut ids = Vec::new();
        for captures in self.item_pattern.captures_iter(html) {
            let id = captures[1].to_string();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    fn detail_url(&self, item_id: &str) -> String {
        format!("{}/item?item_no={}", BASE, item_id)
    }

    fn detail_readiness(&self) -> Readiness {
        Readiness::DocumentLoaded
    }

    fn detect_block(&self, html: &str) -> Option<String> {
        if html.contains("ACCESS DENIED") {
            Some("access denied banner".to_string())
        } else {
            None
        }
    }

    fn extraction_rules(&self) -> &ExtractionRules {
        &self.rules
    }
}

/// In-memory sink for asserting committed records.
pub struct MemorySink {
    records: Mutex<Vec<ProductRecord>>,
    known: Vec<String>,
    commit_delay: Duration,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            known: Vec::new(),
            commit_delay: Duration::ZERO,
        }
    }

    /// Pretend these ids were stored by an earlier run.
    pub fn with_known(ids: &[&str]) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            known: ids.iter().map(|id| id.to_string()).collect(),
            commit_delay: Duration::ZERO,
        }
    }

    pub fn with_commit_delay(commit_delay: Duration) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            known: Vec::new(),
            commit_delay,
        }
    }

    pub fn records(&self) -> Vec<ProductRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn commit(&self, record: &ProductRecord) -> Result<(), SinkError> {
        if !self.commit_delay.is_zero() {
            tokio::time::sleep(self.commit_delay).await;
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn stored_ids(&self, _site: &str) -> Result<Vec<String>, SinkError> {
        Ok(self.known.clone())
    }
}

/// Sink that rejects every commit.
pub struct BrokenSink;

#[async_trait]
impl RecordSink for BrokenSink {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn commit(&self, _record: &ProductRecord) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("sink offline".to_string()))
    }
}

pub fn run_settings() -> RunSettings {
    RunSettings {
        site: "testshop".to_string(),
        item_ids: Vec::new(),
        max_items: None,
        new_items_only: false,
        reference_dataset: None,
        time_budget_secs: None,
    }
}

pub fn site_settings() -> SiteSettings {
    SiteSettings {
        base_url: BASE.to_string(),
        engine: "scripted".to_string(),
        max_concurrent_sessions: 2,
        acquire_timeout_ms: 5_000,
        persistent_context: false,
        min_delay_ms: 0,
        max_delay_ms: 0,
        inter_scope_delay_min_ms: 0,
        inter_scope_delay_max_ms: 0,
        max_retries: 2,
        retry_delay_ms: 100,
        request_timeout_secs: 120,
        item_cap_per_scope: 100,
        consecutive_failure_threshold: 0,
        scope_ids: vec!["cat1".to_string()],
    }
}

pub fn storage_settings() -> StorageSettings {
    StorageSettings {
        sinks: vec!["memory".to_string()],
        jsonl_path: String::new(),
        csv_path: String::new(),
        database_url: String::new(),
        queue_capacity: 16,
        commit_workers: 2,
    }
}

pub fn listing_html(ids: &[&str]) -> String {
    let mut html = String::from("<html><body>");
    for id in ids {
        html.push_str(&format!("<a href=\"/item?item_no={}\">item {}</a>", id, id));
    }
    html.push_str("</body></html>");
    html
}

pub fn scopes_html(scopes: &[&str]) -> String {
    let mut html = String::from("<html><body>");
    for scope in scopes {
        html.push_str(&format!("<a href=\"/list?scope={}\">{}</a>", scope, scope));
    }
    html.push_str("</body></html>");
    html
}

pub fn detail_page(name: &str, price: &str) -> String {
    format!(
        "<html><body><div class=\"name\">{}</div><div class=\"price\">{}</div>\
         <img src=\"http://img.test/a.jpg\"/><div class=\"detail\">detail body</div></body></html>",
        name, price
    )
}

/// Wires a full orchestrator around scripted engine, memory sink and a
/// temp failure report directory.
pub struct TestRig {
    pub run_id: Uuid,
    pub engine: Arc<ScriptedEngine>,
    pub sink: Arc<MemorySink>,
    pub reporter: Arc<FailureReporter>,
    pub cancel: CancelFlag,
    _report_dir: tempfile::TempDir,
}

impl TestRig {
    pub async fn create() -> Self {
        Self::create_with(ScriptedEngine::new(), MemorySink::new()).await
    }

    pub async fn create_with(engine: ScriptedEngine, sink: MemorySink) -> Self {
        let report_dir = tempfile::tempdir().unwrap();
        let run_id = Uuid::new_v4();
        let reporter = Arc::new(
            FailureReporter::create(report_dir.path(), run_id, "item_no")
                .await
                .unwrap(),
        );
        Self {
            run_id,
            engine: Arc::new(engine),
            sink: Arc::new(sink),
            reporter,
            cancel: CancelFlag::new(),
            _report_dir: report_dir,
        }
    }

    pub fn orchestrator(&self, run: RunSettings, site: SiteSettings) -> CrawlOrchestrator {
        self.orchestrator_with_sinks(run, site, vec![self.sink.clone() as Arc<dyn RecordSink>])
    }

    pub fn orchestrator_with_sinks(
        &self,
        run: RunSettings,
        site: SiteSettings,
        sinks: Vec<Arc<dyn RecordSink>>,
    ) -> CrawlOrchestrator {
        CrawlOrchestrator::new(
            self.run_id,
            "testshop".to_string(),
            run,
            site,
            &storage_settings(),
            Url::parse(BASE).unwrap(),
            Arc::new(TestProfile::new()),
            self.engine.clone(),
            sinks,
            self.reporter.clone(),
            self.cancel.clone(),
        )
    }

    pub fn detail_url(&self, item_id: &str) -> String {
        format!("{}/item?item_no={}", BASE, item_id)
    }

    pub fn listing_url(&self, scope_id: &str, page: u32) -> String {
        format!("{}/list/{}?page={}", BASE, scope_id, page)
    }

    /// Parsed lines of the failure report, empty when no file was written.
    pub fn failure_log_lines(&self) -> Vec<serde_json::Value> {
        let Some(path) = self.reporter.log_path() else {
            return Vec::new();
        };
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}
