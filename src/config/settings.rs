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

use std::collections::HashMap;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use validator::Validate;

/// 应用程序配置设置
///
/// 包含运行参数、各站点爬取参数、存储与失败报告等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 本次运行配置
    pub run: RunSettings,
    /// 站点配置表，键为站点名
    pub sites: HashMap<String, SiteSettings>,
    /// 存储配置
    pub storage: StorageSettings,
    /// 失败报告配置
    pub report: ReportSettings,
}

/// 运行配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RunSettings {
    /// 目标站点名
    #[validate(length(min = 1))]
    pub site: String,
    /// 直接指定的商品编号清单，非空时跳过范围遍历
    pub item_ids: Vec<String>,
    /// 全局商品数量预算
    pub max_items: Option<usize>,
    /// 是否只采集未入库的新商品
    pub new_items_only: bool,
    /// 参考数据集路径 (JSONL)，其中的编号视为已采集
    pub reference_dataset: Option<String>,
    /// 运行时间预算（秒）
    pub time_budget_secs: Option<u64>,
}

/// 站点配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SiteSettings {
    /// 站点基础URL
    #[validate(url)]
    pub base_url: String,
    /// 页面引擎 (chromium, http)
    #[validate(length(min = 1))]
    pub engine: String,
    /// 最大并发会话数
    #[validate(range(min = 1, max = 32))]
    pub max_concurrent_sessions: usize,
    /// 会话租约等待超时（毫秒）
    #[validate(range(min = 1))]
    pub acquire_timeout_ms: u64,
    /// 是否跨商品复用同一会话上下文（保持 Cookie 与身份）
    pub persistent_context: bool,
    /// 商品间最小延迟（毫秒）
    pub min_delay_ms: u64,
    /// 商品间最大延迟（毫秒）
    pub max_delay_ms: u64,
    /// 范围间最小延迟（毫秒）
    pub inter_scope_delay_min_ms: u64,
    /// 范围间最大延迟（毫秒）
    pub inter_scope_delay_max_ms: u64,
    /// 最大重试次数
    #[validate(range(max = 10))]
    pub max_retries: u32,
    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,
    /// 单页请求超时（秒）
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
    /// 每个范围的商品数量上限
    #[validate(range(min = 1))]
    pub item_cap_per_scope: usize,
    /// 连续失败熔断阈值，0 表示不熔断
    pub consecutive_failure_threshold: u32,
    /// 配置的遍历范围编号，空时从站点入口页发现
    pub scope_ids: Vec<String>,
}

/// 存储配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StorageSettings {
    /// 启用的落地后端 (jsonl, csv, sqlite)
    #[validate(length(min = 1))]
    pub sinks: Vec<String>,
    /// JSONL 输出路径
    pub jsonl_path: String,
    /// CSV 输出路径
    pub csv_path: String,
    /// SQLite 连接URL
    pub database_url: String,
    /// 提交队列容量
    #[validate(range(min = 1))]
    pub queue_capacity: usize,
    /// 提交协程数量
    #[validate(range(min = 1, max = 16))]
    pub commit_workers: usize,
}

/// 失败报告配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReportSettings {
    /// 失败报告输出目录
    #[validate(length(min = 1))]
    pub dir: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从默认值、配置文件和环境变量依次加载，后者覆盖前者
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载且通过校验的配置
    /// * `Err(ConfigError)` - 配置加载或校验失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default run settings
            .set_default("run.site", "asmama")?
            .set_default("run.item_ids", Vec::<String>::new())?
            .set_default("run.new_items_only", true)?
            // Default Asmama site settings
            .set_default("sites.asmama.base_url", "http://www.asmama.com")?
            .set_default("sites.asmama.engine", "chromium")?
            .set_default("sites.asmama.max_concurrent_sessions", 3)?
            .set_default("sites.asmama.acquire_timeout_ms", 60000)?
            .set_default("sites.asmama.persistent_context", false)?
            .set_default("sites.asmama.min_delay_ms", 2000)?
            .set_default("sites.asmama.max_delay_ms", 3000)?
            .set_default("sites.asmama.inter_scope_delay_min_ms", 3000)?
            .set_default("sites.asmama.inter_scope_delay_max_ms", 5000)?
            .set_default("sites.asmama.max_retries", 3)?
            .set_default("sites.asmama.retry_delay_ms", 5000)?
            .set_default("sites.asmama.request_timeout_secs", 30)?
            .set_default("sites.asmama.item_cap_per_scope", 30)?
            .set_default("sites.asmama.consecutive_failure_threshold", 5)?
            .set_default("sites.asmama.scope_ids", Vec::<String>::new())?
            // Default Oliveyoung site settings
            .set_default("sites.oliveyoung.base_url", "https://www.oliveyoung.co.kr")?
            .set_default("sites.oliveyoung.engine", "chromium")?
            .set_default("sites.oliveyoung.max_concurrent_sessions", 1)?
            .set_default("sites.oliveyoung.acquire_timeout_ms", 60000)?
            .set_default("sites.oliveyoung.persistent_context", true)?
            .set_default("sites.oliveyoung.min_delay_ms", 2000)?
            .set_default("sites.oliveyoung.max_delay_ms", 4000)?
            .set_default("sites.oliveyoung.inter_scope_delay_min_ms", 5000)?
            .set_default("sites.oliveyoung.inter_scope_delay_max_ms", 8000)?
            .set_default("sites.oliveyoung.max_retries", 3)?
            .set_default("sites.oliveyoung.retry_delay_ms", 5000)?
            .set_default("sites.oliveyoung.request_timeout_secs", 30)?
            .set_default("sites.oliveyoung.item_cap_per_scope", 15)?
            .set_default("sites.oliveyoung.consecutive_failure_threshold", 5)?
            .set_default("sites.oliveyoung.scope_ids", Vec::<String>::new())?
            // Default Storage settings
            .set_default("storage.sinks", vec!["jsonl".to_string()])?
            .set_default("storage.jsonl_path", "data/products.jsonl")?
            .set_default("storage.csv_path", "data/products.csv")?
            .set_default("storage.database_url", "sqlite://data/products.db")?
            .set_default("storage.queue_capacity", 64)?
            .set_default("storage.commit_workers", 2)?
            // Default Report settings
            .set_default("report.dir", "reports")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("HARVESTRS").separator("__"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate_all()?;
        Ok(settings)
    }

    /// 校验全部配置项
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 全部配置合法
    /// * `Err(ConfigError)` - 首个不合法的配置项
    pub fn validate_all(&self) -> Result<(), ConfigError> {
        self.run
            .validate()
            .map_err(|e| ConfigError::Message(format!("invalid run settings: {}", e)))?;
        self.storage
            .validate()
            .map_err(|e| ConfigError::Message(format!("invalid storage settings: {}", e)))?;
        self.report
            .validate()
            .map_err(|e| ConfigError::Message(format!("invalid report settings: {}", e)))?;
        for (name, site) in &self.sites {
            site.validate()
                .map_err(|e| ConfigError::Message(format!("invalid settings for site {}: {}", name, e)))?;
        }
        Ok(())
    }
}
