// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use harvestrs::domain::sinks::record_sink::RecordSink;
use harvestrs::engines::traits::EngineError;

use crate::helpers::{
    self, detail_page, listing_html, BrokenSink, MemorySink, ScriptedEngine, TestRig,
};

#[tokio::test(start_paused = true)]
async fn test_retry_recovers_after_transient_failures() {
    let rig = TestRig::create().await;
    rig.engine
        .script_html(&rig.listing_url("cat1", 1), &listing_html(&["101"]));
    rig.engine
        .script_html(&rig.listing_url("cat1", 2), &listing_html(&[]));
    let detail = rig.detail_url("101");
    rig.engine
        .script(&detail, Err(EngineError::Navigation("connection reset".to_string())));
    rig.engine
        .script(&detail, Err(EngineError::Navigation("connection reset".to_string())));
    rig.engine.script_html(&detail, &detail_page("Item 101", "1,000원"));

    let summary = rig
        .orchestrator(helpers::run_settings(), helpers::site_settings())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);
    assert!(summary.failure_log.is_none());
    assert_eq!(rig.engine.calls_matching("item_no=101"), 3);
    assert!(rig.failure_log_lines().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_record_failure() {
    let rig = TestRig::create().await;
    rig.engine
        .script_html(&rig.listing_url("cat1", 1), &listing_html(&["101"]));
    rig.engine
        .script_html(&rig.listing_url("cat1", 2), &listing_html(&[]));
    let detail = rig.detail_url("101");
    for _ in 0..3 {
        rig.engine
            .script(&detail, Err(EngineError::ReadinessTimeout(".name".to_string())));
    }

    let summary = rig
        .orchestrator(helpers::run_settings(), helpers::site_settings())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.scopes.get("cat1").unwrap().failed, 1);
    assert!(summary.failure_log.is_some());
    assert_eq!(rig.engine.calls_matching("item_no=101"), 3);

    let lines = rig.failure_log_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["reason"], "readiness_timeout");
    assert_eq!(lines[0]["attempt_count"], 2);
    assert_eq!(lines[0]["item_no"], "101");
    assert_eq!(lines[0]["scope_id"], "cat1");
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_backoff_doubles_delay() {
    let rig = TestRig::create().await;
    rig.engine
        .script_html(&rig.listing_url("cat1", 1), &listing_html(&["101"]));
    rig.engine
        .script_html(&rig.listing_url("cat1", 2), &listing_html(&[]));
    let detail = rig.detail_url("101");
    rig.engine.script(&detail, Err(EngineError::BlockedStatus(429)));
    rig.engine.script_html(&detail, &detail_page("Item 101", "1,000원"));

    let mut site = helpers::site_settings();
    site.max_retries = 1;

    let started = tokio::time::Instant::now();
    let summary = rig
        .orchestrator(helpers::run_settings(), site)
        .run()
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);
    // First rate-limit wait is retry_delay doubled, not the plain 100ms
    assert!(elapsed >= Duration::from_millis(200), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(300), "elapsed {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_block_marker_classified_as_rate_limit() {
    let rig = TestRig::create().await;
    rig.engine
        .script_html(&rig.listing_url("cat1", 1), &listing_html(&["101"]));
    rig.engine
        .script_html(&rig.listing_url("cat1", 2), &listing_html(&[]));
    let blocked = "<html><body><h1>ACCESS DENIED</h1></body></html>";
    let detail = rig.detail_url("101");
    for _ in 0..3 {
        rig.engine.script_html(&detail, blocked);
    }

    let summary = rig
        .orchestrator(helpers::run_settings(), helpers::site_settings())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(rig.engine.calls_matching("item_no=101"), 3);

    let lines = rig.failure_log_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["reason"], "rate_limit_suspected");
    assert_eq!(lines[0]["attempt_count"], 2);
}

#[tokio::test]
async fn test_listing_block_skips_scope_and_continues() {
    let rig = TestRig::create().await;
    rig.engine.script_html(
        &rig.listing_url("cat1", 1),
        "<html><body><h1>ACCESS DENIED</h1></body></html>",
    );
    rig.engine
        .script_html(&rig.listing_url("cat2", 1), &listing_html(&["201"]));
    rig.engine
        .script_html(&rig.listing_url("cat2", 2), &listing_html(&[]));
    rig.engine
        .script_html(&rig.detail_url("201"), &detail_page("Item 201", "3,000원"));

    let mut site = helpers::site_settings();
    site.scope_ids = vec!["cat1".to_string(), "cat2".to_string()];

    let summary = rig
        .orchestrator(helpers::run_settings(), site)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.skipped_scopes, vec!["cat1".to_string()]);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);
    assert!(!summary.is_clean());
    // A skipped scope is not an item failure, no report lines
    assert!(rig.failure_log_lines().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_missing_price_is_extraction_failure() {
    let rig = TestRig::create().await;
    rig.engine
        .script_html(&rig.listing_url("cat1", 1), &listing_html(&["101"]));
    rig.engine
        .script_html(&rig.listing_url("cat1", 2), &listing_html(&[]));
    let priceless = "<html><body><div class=\"name\">Item 101</div>\
                     <img src=\"http://img.test/a.jpg\"/></body></html>";
    let detail = rig.detail_url("101");
    for _ in 0..3 {
        rig.engine.script_html(&detail, priceless);
    }

    let summary = rig
        .orchestrator(helpers::run_settings(), helpers::site_settings())
        .run()
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 1);
    assert_eq!(rig.engine.calls_matching("item_no=101"), 3);
    assert_eq!(rig.sink.count(), 0);

    let lines = rig.failure_log_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["reason"], "extraction_incomplete");
    assert!(lines[0]["trace"].as_str().unwrap().contains("price"));
}

#[tokio::test]
async fn test_consecutive_failures_abandon_scope() {
    let rig = TestRig::create().await;
    let ids: Vec<String> = (101..107).map(|i| i.to_string()).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    rig.engine
        .script_html(&rig.listing_url("cat1", 1), &listing_html(&id_refs));
    rig.engine
        .script_html(&rig.listing_url("cat1", 2), &listing_html(&[]));
    for id in &ids {
        rig.engine.script(
            &rig.detail_url(id),
            Err(EngineError::Navigation("connection refused".to_string())),
        );
    }
    rig.engine
        .script_html(&rig.listing_url("cat2", 1), &listing_html(&["201", "202"]));
    rig.engine
        .script_html(&rig.listing_url("cat2", 2), &listing_html(&[]));
    rig.engine
        .script_html(&rig.detail_url("201"), &detail_page("Item 201", "2,000원"));
    rig.engine
        .script_html(&rig.detail_url("202"), &detail_page("Item 202", "2,100원"));

    let mut site = helpers::site_settings();
    site.scope_ids = vec!["cat1".to_string(), "cat2".to_string()];
    site.max_concurrent_sessions = 1;
    site.max_retries = 0;
    site.consecutive_failure_threshold = 2;

    let summary = rig
        .orchestrator(helpers::run_settings(), site)
        .run()
        .await
        .unwrap();

    // Three failures were observed before the threshold stopped cat1
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.skipped_scopes, vec!["cat1".to_string()]);
    assert_eq!(summary.scopes.get("cat2").unwrap().succeeded, 2);
    assert_eq!(rig.engine.calls_matching("item_no=104"), 0);
    assert_eq!(rig.failure_log_lines().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_cleanly() {
    let engine = ScriptedEngine::with_load_delay(Duration::from_secs(60));
    let rig = TestRig::create_with(engine, MemorySink::new()).await;
    rig.engine
        .script_html(&rig.listing_url("cat1", 1), &listing_html(&["101", "102"]));
    rig.engine
        .script_html(&rig.listing_url("cat1", 2), &listing_html(&[]));
    rig.engine
        .script_html(&rig.detail_url("101"), &detail_page("Item 101", "1,000원"));
    rig.engine
        .script_html(&rig.detail_url("102"), &detail_page("Item 102", "1,100원"));

    // Listing takes 120s of scripted load time, details start after that
    let cancel = rig.cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(150)).await;
        cancel.cancel();
    });

    let summary = rig
        .orchestrator(helpers::run_settings(), helpers::site_settings())
        .run()
        .await
        .unwrap();

    // Both detail loads were in flight when the flag tripped
    assert_eq!(rig.engine.calls_matching("/item?item_no="), 2);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 0);
    assert_eq!(rig.sink.count(), 0);
    assert!(summary.failure_log.is_none());
    assert!(rig.failure_log_lines().is_empty());
}

#[tokio::test]
async fn test_sink_failure_reported_while_items_succeed() {
    let rig = TestRig::create().await;
    rig.engine
        .script_html(&rig.listing_url("cat1", 1), &listing_html(&["101", "102"]));
    rig.engine
        .script_html(&rig.listing_url("cat1", 2), &listing_html(&[]));
    rig.engine
        .script_html(&rig.detail_url("101"), &detail_page("Item 101", "1,000원"));
    rig.engine
        .script_html(&rig.detail_url("102"), &detail_page("Item 102", "1,100원"));

    let sinks: Vec<Arc<dyn RecordSink>> = vec![
        Arc::new(BrokenSink),
        rig.sink.clone() as Arc<dyn RecordSink>,
    ];
    let summary = rig
        .orchestrator_with_sinks(helpers::run_settings(), helpers::site_settings(), sinks)
        .run()
        .await
        .unwrap();

    // Fetches count as succeeded, the healthy sink still got every record
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.sink_failures, 2);
    assert!(!summary.is_clean());
    assert_eq!(rig.sink.count(), 2);

    let lines = rig.failure_log_lines();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert_eq!(line["reason"], "storage_sink_failure");
        assert!(line["scope_id"].is_null());
        assert!(line["trace"].as_str().unwrap().contains("broken"));
    }
}

#[tokio::test(start_paused = true)]
async fn test_summary_waits_for_commit_drain() {
    let sink = MemorySink::with_commit_delay(Duration::from_millis(500));
    let rig = TestRig::create_with(ScriptedEngine::new(), sink).await;
    let ids: Vec<String> = (101..106).map(|i| i.to_string()).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    rig.engine
        .script_html(&rig.listing_url("cat1", 1), &listing_html(&id_refs));
    rig.engine
        .script_html(&rig.listing_url("cat1", 2), &listing_html(&[]));
    for id in &ids {
        rig.engine
            .script_html(&rig.detail_url(id), &detail_page(&format!("Item {}", id), "900원"));
    }

    let summary = rig
        .orchestrator(helpers::run_settings(), helpers::site_settings())
        .run()
        .await
        .unwrap();

    // Slow commits finished before the summary was produced
    assert_eq!(summary.succeeded, 5);
    assert_eq!(summary.sink_failures, 0);
    assert_eq!(rig.sink.count(), 5);
}

#[tokio::test]
async fn test_acquire_timeout_counts_as_failure() {
    let engine = ScriptedEngine::with_load_delay(Duration::from_secs(1));
    let rig = TestRig::create_with(engine, MemorySink::new()).await;
    rig.engine
        .script_html(&rig.detail_url("101"), &detail_page("Item 101", "1,000원"));

    let mut run = helpers::run_settings();
    run.item_ids = vec!["101".to_string(), "102".to_string(), "103".to_string()];
    let mut site = helpers::site_settings();
    site.max_concurrent_sessions = 1;
    site.acquire_timeout_ms = 100;

    let summary = rig.orchestrator(run, site).run().await.unwrap();

    // First item holds the only session for a full second, the other
    // two give up waiting after 100ms each
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(rig.sink.count(), 1);
    assert_eq!(rig.engine.calls_matching("/item?item_no="), 1);

    let lines = rig.failure_log_lines();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert_eq!(line["reason"], "pool_exhaustion_timeout");
        assert_eq!(line["attempt_count"], 0);
        assert_eq!(line["scope_id"], "direct");
    }
}
