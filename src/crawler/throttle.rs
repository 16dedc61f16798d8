// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use tracing::debug;

/// 等待类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitKind {
    /// 同一范围内两次请求之间
    BetweenItems,
    /// 两个范围之间
    BetweenScopes,
}

/// 节流器
///
/// 在派发路径上注入配置区间内的随机延迟，保证任意两次请求之间
/// 至少间隔配置的下限。延迟发生在租约获取之前，不占用并发槽。
pub struct Throttle {
    item_delay_ms: (u64, u64),
    scope_delay_ms: (u64, u64),
}

impl Throttle {
    /// # 参数
    /// * `item_delay_ms` - 请求间延迟区间（毫秒，含两端）
    /// * `scope_delay_ms` - 范围间延迟区间（毫秒，含两端）
    pub fn new(item_delay_ms: (u64, u64), scope_delay_ms: (u64, u64)) -> Self {
        Self {
            item_delay_ms,
            scope_delay_ms,
        }
    }

    /// 在区间内抽取一次等待时长
    fn sample(&self, kind: WaitKind) -> Duration {
        let (min, max) = match kind {
            WaitKind::BetweenItems => self.item_delay_ms,
            WaitKind::BetweenScopes => self.scope_delay_ms,
        };
        if max <= min {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::random_range(min..=max))
    }

    /// 等待一段随机间隔
    pub async fn wait(&self, kind: WaitKind) {
        let delay = self.sample(kind);
        debug!(kind = ?kind, delay_ms = delay.as_millis() as u64, "throttle wait");
        tokio::time::sleep(delay).await;
    }

    pub async fn between_items(&self) {
        self.wait(WaitKind::BetweenItems).await;
    }

    pub async fn between_scopes(&self) {
        self.wait(WaitKind::BetweenScopes).await;
    }
}
