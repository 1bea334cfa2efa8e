//! 缓存标签注册表
//!
//! 使用 DashMap 实现无锁并发的版本号管理。
//! 每个缓存标签维护独立的版本号，支持原子递增。
//!
//! # 使用场景
//!
//! 列表响应头携带 `X-Cache-Tags: orders:3,statistics:7`，下游缓存层
//! 以标签版本判断新旧；写路径调用 [`CacheTagRegistry::revalidate`]
//! 使相关标签失效。

use dashmap::DashMap;

/// 缓存标签版本注册表
#[derive(Debug)]
pub struct CacheTagRegistry {
    versions: DashMap<String, u64>,
}

impl CacheTagRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定标签的版本号并返回新值
    ///
    /// 标签不存在时从 0 开始递增（返回 1）
    pub fn invalidate(&self, tag: &str) -> u64 {
        let mut entry = self.versions.entry(tag.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 批量失效
    pub fn revalidate(&self, tags: &[&str]) {
        for tag in tags {
            self.invalidate(tag);
        }
    }

    /// 获取指定标签的当前版本号
    ///
    /// 标签不存在时返回 0
    pub fn version(&self, tag: &str) -> u64 {
        self.versions.get(tag).map(|v| *v).unwrap_or(0)
    }

    /// `X-Cache-Tags` 头的值: "tag:version,tag:version"
    pub fn header_value(&self, tags: &[&str]) -> String {
        tags.iter()
            .map(|t| format!("{}:{}", t, self.version(t)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for CacheTagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_start_at_zero_and_increment() {
        let registry = CacheTagRegistry::new();
        assert_eq!(registry.version("orders"), 0);
        assert_eq!(registry.invalidate("orders"), 1);
        assert_eq!(registry.invalidate("orders"), 2);
        assert_eq!(registry.version("orders"), 2);
    }

    #[test]
    fn revalidate_bumps_every_tag() {
        let registry = CacheTagRegistry::new();
        registry.revalidate(&["orders", "inventory", "statistics"]);
        assert_eq!(registry.version("orders"), 1);
        assert_eq!(registry.version("inventory"), 1);
        assert_eq!(registry.version("statistics"), 1);
    }

    #[test]
    fn header_value_format() {
        let registry = CacheTagRegistry::new();
        registry.invalidate("orders");
        assert_eq!(
            registry.header_value(&["orders", "statistics"]),
            "orders:1,statistics:0"
        );
    }
}
