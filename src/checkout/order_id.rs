//! 订单展示号生成
//!
//! 形如 `BRD-1234567`：品牌前缀取品牌名的前三个字母数字字符，
//! 后缀取创建时间毫秒数的后七位。品牌无法解析时只有后缀。
//!
//! 后缀由时间推导，不做碰撞检查——展示号只用于人读场景，
//! 真正的订单标识是数据库记录 id。

use chrono::{DateTime, Utc};

/// Generate the brand-prefixed display id
///
/// Pure function of (brand, timestamp).
pub fn generate_display_id(brand: Option<&str>, at: DateTime<Utc>) -> String {
    let suffix = at.timestamp_millis().rem_euclid(10_000_000);
    match brand.and_then(brand_prefix) {
        Some(prefix) => format!("{prefix}-{suffix:07}"),
        None => format!("{suffix:07}"),
    }
}

/// First three alphanumeric characters of the brand name, uppercased
fn brand_prefix(brand: &str) -> Option<String> {
    let prefix: String = brand
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase();
    if prefix.is_empty() { None } else { Some(prefix) }
}
