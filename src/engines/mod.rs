// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 页面引擎模块
///
/// 提供两种页面加载实现：
/// - chromium_engine：基于 chromiumoxide 的真实浏览器引擎，默认选择
/// - http_engine：基于 reqwest 的轻量 HTTP 引擎，适用于无脚本站点
pub mod chromium_engine;
pub mod http_engine;
pub mod traits;

use std::sync::Arc;

use traits::{EngineError, PageEngine};

/// 引擎类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Chromium,
    Http,
}

impl EngineKind {
    /// 引擎名称
    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Chromium => "chromium",
            EngineKind::Http => "http",
        }
    }

    /// 从配置名解析引擎类型
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "chromium" | "browser" => Some(EngineKind::Chromium),
            "http" | "plain" => Some(EngineKind::Http),
            _ => None,
        }
    }
}

/// 按配置名创建页面引擎
pub fn create_engine(name: &str) -> Result<Arc<dyn PageEngine>, EngineError> {
    let kind = EngineKind::parse(name)
        .ok_or_else(|| EngineError::Other(format!("unknown engine kind: {}", name)))?;
    match kind {
        EngineKind::Chromium => Ok(Arc::new(chromium_engine::ChromiumEngine::new())),
        EngineKind::Http => Ok(Arc::new(http_engine::HttpEngine::new()?)),
    }
}
