// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 站点画像契约
pub mod profile;

pub use profile::{Readiness, SiteProfile};
