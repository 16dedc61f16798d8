// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use std::path::Path;

use tracing::warn;

/// 去重器
///
/// 维护既有商品编号集合，把已经抓取过的编号从派发队列中过滤掉。
/// 集合在运行开始时装载一次，运行期间只读。
pub struct Deduplicator {
    known: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self {
            known: HashSet::new(),
        }
    }

    pub fn with_known(ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            known: ids.into_iter().collect(),
        }
    }

    /// 从 JSONL 数据集装载既有编号
    ///
    /// 每行一个 JSON 对象，编号取 `item_id` 字段，兼容以站点
    /// 专属字段名（如 `branduid`）记录的旧数据。坏行跳过并告警。
    pub async fn load_reference(
        path: &Path,
        site_id_field: &str,
    ) -> Result<HashSet<String>, std::io::Error> {
        let content = tokio::fs::read_to_string(path).await?;
        let mut ids = HashSet::new();
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: serde_json::Value = match serde_json::from_str(line) {
                Ok(value) => value,
                Err(error) => {
                    warn!(line = line_no + 1, %error, "skipping malformed reference line");
                    continue;
                }
            };
            let id = value
                .get("item_id")
                .or_else(|| value.get(site_id_field))
                .and_then(|v| v.as_str());
            match id {
                Some(id) => {
                    ids.insert(id.to_string());
                }
                None => {
                    warn!(line = line_no + 1, "reference line has no item id field");
                }
            }
        }
        Ok(ids)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.known.contains(id)
    }

    /// 过滤出未见过的编号
    ///
    /// # 返回值
    /// 保持原顺序的新编号清单和被跳过的重复数量
    pub fn filter_new(&self, ids: &[String]) -> (Vec<String>, usize) {
        let mut fresh = Vec::new();
        let mut skipped = 0;
        for id in ids {
            if self.known.contains(id) {
                skipped += 1;
            } else {
                fresh.push(id.clone());
            }
        }
        (fresh, skipped)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new()
    }
}
