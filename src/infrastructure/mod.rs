// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施模块
///
/// 领域契约的具体实现：站点画像、存储端与失败报告器
pub mod reporter;
pub mod sinks;
pub mod sites;
