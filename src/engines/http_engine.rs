// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Instant;

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::header::USER_AGENT;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use uuid::Uuid;

use crate::domain::sites::profile::Readiness;
use crate::engines::traits::{EngineError, PageEngine, PageRequest, PageSnapshot};

/// HTTP 引擎
///
/// 基于 reqwest 的轻量引擎，适合内容在首个响应中就绪的站点。
/// 无状态加载使用不带 Cookie 的共享客户端；持久会话按上下文编号
/// 各持有一个启用 Cookie 存储的客户端。
pub struct HttpEngine {
    stateless_client: Client,
    context_clients: DashMap<Uuid, Client>,
}

impl HttpEngine {
    pub fn new() -> Result<Self, EngineError> {
        let stateless_client = Client::builder()
            .redirect(Policy::limited(10))
            .build()?;
        Ok(Self {
            stateless_client,
            context_clients: DashMap::new(),
        })
    }

    /// 选择请求使用的客户端
    fn client_for(&self, context_id: Option<Uuid>) -> Result<Client, EngineError> {
        let Some(context_id) = context_id else {
            return Ok(self.stateless_client.clone());
        };
        if let Some(client) = self.context_clients.get(&context_id) {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .redirect(Policy::limited(10))
            .cookie_store(true)
            .build()?;
        self.context_clients.insert(context_id, client.clone());
        Ok(client)
    }

    /// 响应体上的即时就绪检查，静态内容没有可轮询的状态
    fn check_readiness(html: &str, readiness: &Readiness) -> Result<(), EngineError> {
        match readiness {
            Readiness::DocumentLoaded => Ok(()),
            Readiness::Marker(marker) => {
                if html.contains(marker.as_str()) {
                    Ok(())
                } else {
                    Err(EngineError::ReadinessTimeout(marker.clone()))
                }
            }
            Readiness::Selector(css) => {
                let selector = Selector::parse(css)
                    .map_err(|e| EngineError::Other(format!("invalid selector `{}`: {}", css, e)))?;
                let document = Html::parse_document(html);
                if document.select(&selector).next().is_some() {
                    Ok(())
                } else {
                    Err(EngineError::ReadinessTimeout(css.clone()))
                }
            }
        }
    }
}

#[async_trait]
impl PageEngine for HttpEngine {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn load(&self, request: &PageRequest) -> Result<PageSnapshot, EngineError> {
        let client = self.client_for(request.context_id)?;
        let start = Instant::now();

        let response = client
            .get(&request.url)
            .header(USER_AGENT, request.user_agent.as_str())
            .timeout(request.timeout)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(EngineError::BlockedStatus(status.as_u16()));
        }
        if !status.is_success() {
            return Err(EngineError::Navigation(format!("status {}", status)));
        }

        let url = response.url().to_string();
        let html = response.text().await?;

        Self::check_readiness(&html, &request.readiness)?;

        Ok(PageSnapshot {
            url,
            html,
            elapsed: start.elapsed(),
        })
    }
}
