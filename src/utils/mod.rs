// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 提供错误分类、重试策略、遥测初始化与文本归一化等通用能力
pub mod errors;
pub mod retry_policy;
pub mod telemetry;
pub mod text;

pub use errors::CrawlError;
pub use retry_policy::RetryPolicy;
