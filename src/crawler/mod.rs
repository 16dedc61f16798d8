// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 爬取编排模块
///
/// 将站点画像、页面引擎、会话池与存储协调器组合成完整的采集运行：
/// - identity：会话身份随机化
/// - session_pool：按站点限额的会话租约
/// - throttle：请求间随机延迟
/// - dedup：对既有数据集去重
/// - fetcher：带重试的单品抓取
/// - traverser：范围枚举与列表翻页
/// - orchestrator：运行驱动与汇总
pub mod cancel;
pub mod dedup;
pub mod fetcher;
pub mod identity;
pub mod orchestrator;
pub mod session_pool;
pub mod stats;
pub mod throttle;
pub mod traverser;

pub use cancel::CancelFlag;
pub use orchestrator::CrawlOrchestrator;
pub use session_pool::{SessionLease, SessionPool};
