// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 存储端契约
pub mod record_sink;

pub use record_sink::{RecordSink, SinkError};
