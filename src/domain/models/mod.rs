// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型
///
/// 定义运行期传递的核心数据结构
pub mod failure;
pub mod product;
pub mod scope;
pub mod summary;
pub mod work_item;

pub use failure::{FailureReason, FailureRecord};
pub use product::ProductRecord;
pub use scope::ScopeDescriptor;
pub use summary::{RunSummary, ScopeCounts};
pub use work_item::WorkItem;
