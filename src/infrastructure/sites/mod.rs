// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 站点画像实现
///
/// 每个支持的站点一个画像，经工厂按配置名创建
pub mod asmama;
pub mod factory;
pub mod oliveyoung;

pub use asmama::AsmamaProfile;
pub use factory::{create_profile, SiteKind};
pub use oliveyoung::OliveyoungProfile;
