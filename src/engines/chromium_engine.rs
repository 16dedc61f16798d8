// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::sync::OnceCell;

use crate::domain::sites::profile::Readiness;
use crate::engines::traits::{EngineError, PageEngine, PageRequest, PageSnapshot};

/// 就绪条件的轮询预算，导航本身另受请求超时约束
const READINESS_TIMEOUT: Duration = Duration::from_secs(10);
/// 就绪条件的轮询间隔
const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(250);

// Global browser instance to avoid re-launching Chrome on every request.
static BROWSER_INSTANCE: OnceCell<Browser> = OnceCell::const_new();

// Asynchronously gets or initializes the shared browser instance.
// This function ensures that the browser is launched only once.
async fn get_browser() -> Result<&'static Browser, EngineError> {
    BROWSER_INSTANCE
        .get_or_try_init(|| async {
            let mut builder = BrowserConfig::builder()
                .no_sandbox()
                .request_timeout(Duration::from_secs(30));

            builder = builder.arg("--disable-gpu").arg("--disable-dev-shm-usage");

            let (browser, mut handler) = Browser::launch(
                builder
                    .build()
                    .map_err(|e| EngineError::Other(e.to_string()))?,
            )
            .await
            .map_err(|e| EngineError::Other(e.to_string()))?;

            // Spawn a handler to process browser events
            tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            Ok(browser)
        })
        .await
}

/// Chromium 引擎
///
/// 基于 chromiumoxide 的真实浏览器引擎。每次加载新开页面，
/// 按请求伪装 User-Agent 与视口，Cookie 在共享浏览器内自然延续。
pub struct ChromiumEngine;

impl ChromiumEngine {
    pub fn new() -> Self {
        Self
    }

    /// 在已创建的页面上完成一次加载
    async fn drive(page: &Page, request: &PageRequest) -> Result<String, EngineError> {
        page.set_user_agent(request.user_agent.as_str())
            .await
            .map_err(|e| EngineError::Other(e.to_string()))?;

        let metrics = SetDeviceMetricsOverrideParams::builder()
            .width(request.viewport.width as i64)
            .height(request.viewport.height as i64)
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(EngineError::Other)?;
        page.execute(metrics)
            .await
            .map_err(|e| EngineError::Other(e.to_string()))?;

        // goto waits for the load event by default
        page.goto(request.url.as_str())
            .await
            .map_err(|e| EngineError::Navigation(e.to_string()))?;

        Self::await_readiness(page, &request.readiness).await?;

        page.content()
            .await
            .map_err(|e| EngineError::Other(e.to_string()))
    }

    /// 轮询就绪条件直至命中或耗尽预算
    async fn await_readiness(page: &Page, readiness: &Readiness) -> Result<(), EngineError> {
        let deadline = Instant::now() + READINESS_TIMEOUT;
        match readiness {
            Readiness::DocumentLoaded => Ok(()),
            Readiness::Selector(selector) => loop {
                if page.find_element(selector.as_str()).await.is_ok() {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    return Err(EngineError::ReadinessTimeout(selector.clone()));
                }
                tokio::time::sleep(READINESS_POLL_INTERVAL).await;
            },
            Readiness::Marker(marker) => loop {
                let html = page
                    .content()
                    .await
                    .map_err(|e| EngineError::Other(e.to_string()))?;
                if html.contains(marker.as_str()) {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    return Err(EngineError::ReadinessTimeout(marker.clone()));
                }
                tokio::time::sleep(READINESS_POLL_INTERVAL).await;
            },
        }
    }
}

impl Default for ChromiumEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageEngine for ChromiumEngine {
    fn name(&self) -> &'static str {
        "chromium"
    }

    async fn load(&self, request: &PageRequest) -> Result<PageSnapshot, EngineError> {
        let start = Instant::now();

        let result = tokio::time::timeout(request.timeout, async {
            let browser = get_browser().await?;

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| EngineError::Navigation(e.to_string()))?;

            let outcome = Self::drive(&page, request).await;
            page.close().await.ok();
            outcome
        })
        .await;

        let html = match result {
            Ok(inner) => inner?,
            Err(_) => return Err(EngineError::Timeout),
        };

        Ok(PageSnapshot {
            url: request.url.clone(),
            html,
            elapsed: start.elapsed(),
        })
    }
}
