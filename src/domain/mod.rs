// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模块
///
/// 包含核心领域模型、站点画像与存储端契约、字段提取服务
pub mod models;
pub mod services;
pub mod sinks;
pub mod sites;
