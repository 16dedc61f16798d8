// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::OnceCell;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static TELEMETRY: OnceCell<()> = OnceCell::new();

/// 初始化遥测
///
/// 从 `RUST_LOG` 读取过滤规则，未设置时默认 `info,harvestrs=debug`。
/// 重复调用是安全的，后续调用不做任何事。
pub fn init_telemetry() {
    TELEMETRY.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,harvestrs=debug"));

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init();
    });
}
