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

use std::path::Path;
use std::sync::Arc;

use harvestrs::config::settings::Settings;
use harvestrs::crawler::cancel::CancelFlag;
use harvestrs::crawler::orchestrator::CrawlOrchestrator;
use harvestrs::engines::create_engine;
use harvestrs::infrastructure::reporter::FailureReporter;
use harvestrs::infrastructure::sinks::create_sinks;
use harvestrs::infrastructure::sites::create_profile;
use harvestrs::utils::telemetry;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并执行一次爬取运行
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting harvestrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    let site_name = settings.run.site.clone();
    let site_settings = settings
        .sites
        .get(&site_name)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("no settings for site: {}", site_name))?;
    info!(site = %site_name, "Configuration loaded");

    // 3. Resolve site profile and page engine
    let base_url = Url::parse(&site_settings.base_url)?;
    let profile = create_profile(&site_name, &site_settings.base_url)
        .ok_or_else(|| anyhow::anyhow!("unknown site: {}", site_name))?;
    let engine = create_engine(&site_settings.engine)?;
    info!(engine = engine.name(), "Page engine initialized");

    // 4. Initialize storage sinks
    let sinks = create_sinks(&settings.storage).await?;
    info!(sinks = sinks.len(), "Storage sinks initialized");

    // 5. Create failure reporter
    let run_id = Uuid::new_v4();
    let reporter = Arc::new(
        FailureReporter::create(
            Path::new(&settings.report.dir),
            run_id,
            profile.id_field_name(),
        )
        .await?,
    );

    // 6. Install shutdown signal handler
    let cancel = CancelFlag::new();
    let signal_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight work");
            signal_flag.cancel();
        }
    });

    // 7. Run the crawl
    let orchestrator = CrawlOrchestrator::new(
        run_id,
        site_name,
        settings.run.clone(),
        site_settings,
        &settings.storage,
        base_url,
        profile,
        engine,
        sinks,
        reporter,
        cancel,
    );
    let summary = orchestrator.run().await?;

    // 8. Report the outcome
    info!(
        run_id = %summary.run_id,
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped_duplicates = summary.skipped_duplicates,
        sink_failures = summary.sink_failures,
        elapsed_ms = summary.elapsed_ms,
        "Run complete"
    );
    if let Some(log) = &summary.failure_log {
        info!(path = %log.display(), "Failure details written");
    }

    Ok(())
}
