// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use crate::domain::sites::profile::SiteProfile;
use crate::infrastructure::sites::asmama::AsmamaProfile;
use crate::infrastructure::sites::oliveyoung::OliveyoungProfile;

/// 支持的站点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    Asmama,
    Oliveyoung,
}

impl SiteKind {
    /// 站点名称，与配置键一致
    pub fn name(&self) -> &'static str {
        match self {
            SiteKind::Asmama => "asmama",
            SiteKind::Oliveyoung => "oliveyoung",
        }
    }

    /// 从配置名解析站点类型
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "asmama" => Some(SiteKind::Asmama),
            "oliveyoung" => Some(SiteKind::Oliveyoung),
            _ => None,
        }
    }
}

/// 按配置名创建站点画像
///
/// # 参数
/// * `name` - 站点配置名
/// * `base_url` - 站点根地址，末尾斜杠会被剥掉
pub fn create_profile(name: &str, base_url: &str) -> Option<Arc<dyn SiteProfile>> {
    match SiteKind::parse(name)? {
        SiteKind::Asmama => Some(Arc::new(AsmamaProfile::new(base_url))),
        SiteKind::Oliveyoung => Some(Arc::new(OliveyoungProfile::new(base_url))),
    }
}
