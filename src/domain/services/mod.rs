// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 领域服务封装跨模型的业务规则。当前只有一个服务：
/// - 提取服务（extraction_service）：按站点规则从详情页 HTML 提取商品字段
pub mod extraction_service;
