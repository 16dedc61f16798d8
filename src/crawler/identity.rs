// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 候选 User-Agent 池，对应常见桌面浏览器
const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// 候选视口池，均为主流桌面分辨率
const VIEWPORTS: [Viewport; 5] = [
    Viewport {
        width: 1920,
        height: 1080,
    },
    Viewport {
        width: 1440,
        height: 900,
    },
    Viewport {
        width: 1366,
        height: 768,
    },
    Viewport {
        width: 1536,
        height: 864,
    },
    Viewport {
        width: 1280,
        height: 720,
    },
];

/// 视口尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// 会话身份
///
/// 一次会话使用的伪装参数组合。每个会话独立随机抽取，
/// 持久上下文在整个生命周期内保持同一身份。
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub user_agent: String,
    pub viewport: Viewport,
}

impl SessionIdentity {
    /// 随机抽取一套伪装身份
    pub fn random() -> Self {
        let user_agent = USER_AGENTS[rand::random_range(0..USER_AGENTS.len())].to_string();
        let viewport = VIEWPORTS[rand::random_range(0..VIEWPORTS.len())];
        Self {
            user_agent,
            viewport,
        }
    }
}
