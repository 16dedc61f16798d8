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

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::crawler::identity::Viewport;
use crate::domain::sites::profile::Readiness;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// HTTP 请求失败
    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 导航失败
    #[error("navigation failed: {0}")]
    Navigation(String),
    /// 就绪条件在时限内未满足
    #[error("readiness condition not met: {0}")]
    ReadinessTimeout(String),
    /// 响应状态指示封禁
    #[error("blocked status: {0}")]
    BlockedStatus(u16),
    /// 整体超时
    #[error("timeout")]
    Timeout,
    /// 其他错误
    #[error("engine error: {0}")]
    Other(String),
}

/// 页面加载请求
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// 目标 URL
    pub url: String,
    /// 伪装的 User-Agent
    pub user_agent: String,
    /// 伪装的视口尺寸
    pub viewport: Viewport,
    /// 页面就绪条件
    pub readiness: Readiness,
    /// 整体超时
    pub timeout: Duration,
    /// 持久会话上下文编号，None 表示无状态加载
    pub context_id: Option<Uuid>,
}

/// 页面快照
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    /// 实际加载的 URL
    pub url: String,
    /// 就绪后的完整 HTML
    pub html: String,
    /// 加载耗时
    pub elapsed: Duration,
}

/// 页面引擎
///
/// 加载一个 URL 并在就绪条件满足后返回页面快照。
/// 实现必须遵守请求中的超时与身份伪装参数。
#[async_trait]
pub trait PageEngine: Send + Sync {
    /// 引擎名称
    fn name(&self) -> &'static str;

    /// 加载页面
    ///
    /// # 参数
    ///
    /// * `request` - 页面加载请求
    ///
    /// # 返回值
    ///
    /// * `Ok(PageSnapshot)` - 就绪后的页面快照
    /// * `Err(EngineError)` - 加载过程中出现的错误
    async fn load(&self, request: &PageRequest) -> Result<PageSnapshot, EngineError>;
}
