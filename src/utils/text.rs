// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 清理文本，压缩连续空白并去除首尾空白
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 从价格文本中解析整数金额
///
/// 丢弃货币符号、千位分隔符等非数字字符，例如 `"₩29,900"` 解析为 `29900`。
/// 文本中没有数字时返回 `None`。
pub fn parse_price(price_text: &str) -> Option<i64> {
    let digits: String = price_text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// 按逗号拆分选项文本，去除空白并丢弃空项
pub fn split_options(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
