// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 爬取模块
///
/// 实现运行编排、会话池、节流、去重与重试抓取
pub mod crawler;

/// 领域模块
///
/// 包含核心业务实体、服务和站点画像接口
pub mod domain;

/// 引擎模块
///
/// 实现各种页面加载引擎
pub mod engines;

/// 基础设施模块
///
/// 提供站点画像、落地后端与失败报告等外部集成
pub mod infrastructure;

/// 队列模块
///
/// 实现提交队列功能
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现后台提交处理和工作器管理
pub mod workers;
