// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 遍历范围描述符
///
/// 对应站点的一个类目或一份直接给定的商品清单。
/// 由范围枚举阶段创建，`discovered_item_ids` 在列表遍历完成后填充，
/// 此后整个结构只读。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeDescriptor {
    /// 范围编号，站点内唯一
    pub scope_id: String,
    /// 父范围编号，顶层范围为 None
    pub parent_scope_id: Option<String>,
    /// 本范围最多处理的商品数量
    pub item_cap: usize,
    /// 按发现顺序排列、已去重的商品编号
    pub discovered_item_ids: Vec<String>,
}

impl ScopeDescriptor {
    pub fn new(scope_id: impl Into<String>, item_cap: usize) -> Self {
        Self {
            scope_id: scope_id.into(),
            parent_scope_id: None,
            item_cap,
            discovered_item_ids: Vec::new(),
        }
    }

    /// 以给定的商品清单构造范围，用于直接清单模式
    pub fn with_items(scope_id: impl Into<String>, item_ids: Vec<String>) -> Self {
        let item_cap = item_ids.len();
        Self {
            scope_id: scope_id.into(),
            parent_scope_id: None,
            item_cap,
            discovered_item_ids: item_ids,
        }
    }

    /// 追加新发现的商品编号，忽略重复并遵守数量上限
    ///
    /// # 返回值
    /// 实际追加的数量。返回 0 且入参非空时说明本页没有带来新商品。
    pub fn absorb(&mut self, item_ids: &[String]) -> usize {
        let mut added = 0;
        for id in item_ids {
            if self.discovered_item_ids.len() >= self.item_cap {
                break;
            }
            if self.discovered_item_ids.iter().any(|existing| existing == id) {
                continue;
            }
            self.discovered_item_ids.push(id.clone());
            added += 1;
        }
        added
    }

    pub fn is_full(&self) -> bool {
        self.discovered_item_ids.len() >= self.item_cap
    }
}
